// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! gqlcache - A normalized GraphQL client cache
//!
//! gqlcache executes GraphQL selection sets against server responses or a local normalized
//! store, and keeps that store as a flat, content-addressed set of records with precise change
//! tracking.
//!
//! # Features
//!
//! - **Normalization**: response objects are flattened into records linked by references
//! - **Change tracking**: merges report exactly which `record.field` addresses changed
//! - **Batched reads**: cache reads coalesce record loads per transaction
//! - **Transactions**: many concurrent readers or one exclusive writer
//! - **Watchers**: re-read an operation whenever a write touches its data
//! - **Backends**: in-memory, or Sled for a cache that survives restarts
//!
//! # Usage
//!
//! ```ignore
//! use gqlcache::{GraphQLResponse, Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::in_memory())?;
//! let response = GraphQLResponse::from_slice(body)?;
//! let (result, records) =
//!     response.parse_result(&operation, &variables, store.cache_key_resolver())?;
//! if let Some(records) = records {
//!     store.publish(records, None)?;
//! }
//! let cached = store.load(&operation, &variables)?;
//! ```

pub mod cache;
pub mod exec;
pub mod response;
pub mod selection;
pub mod storage;
pub mod store;
pub mod txn;

/// Any JSON value
pub type JsonValue = serde_json::Value;

/// A JSON object, keeping insertion order
pub type JsonObject = serde_json::Map<String, JsonValue>;

pub use cache::{CacheKey, CacheKeyResolver, CacheReference};
pub use exec::ExecutionError;
pub use response::{GraphQLError, GraphQLResponse, GraphQLResult, IncrementalPayload, ResultSource};
pub use selection::{Field, Operation, OperationKind, OutputType, ScalarType, Selection, Variables};
pub use storage::{NormalizedCache, Record, RecordSet, RecordValue, StorageType};
pub use store::{GraphQLQueryWatcher, Store, StoreConfig, StoreSubscriber, SubscriptionToken};

/// gqlcache version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// gqlcache crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
