// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Normalized cache backends
//!
//! Backends store [`RecordRow`](crate::storage::RecordRow)s by cache key and merge incoming
//! records field by field.
//!
//! # Architecture
//!
//! ```text
//! Store (transactions, lock, subscribers)
//!     ↓
//! NormalizedCache (record abstraction)
//!     ↓
//! Concrete Implementations (Memory, Sled)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use gqlcache::storage::persistent::{create_normalized_cache, StorageType};
//!
//! let cache = create_normalized_cache(StorageType::Sled, Some("./cache"))?;
//! let changed = cache.merge(records)?;
//! let rows = cache.load_records(&["QUERY_ROOT".to_string()])?;
//! ```

// Core modules
pub mod factory;
pub mod traits;
pub mod types;

// Backend implementations
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

// Public API re-exports
pub use factory::create_normalized_cache;
pub use memory::InMemoryNormalizedCache;
#[cfg(feature = "sled-backend")]
pub use self::sled::SledNormalizedCache;
pub use traits::NormalizedCache;
pub use types::{StorageDriverError, StorageResult, StorageType};
