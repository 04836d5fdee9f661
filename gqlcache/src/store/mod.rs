// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Store, transactions and change notification

pub mod config;
#[allow(clippy::module_inception)]
pub mod store;
pub mod subscription;
pub mod transaction;
pub mod watcher;

pub use config::StoreConfig;
pub use store::Store;
pub use subscription::{StoreSubscriber, SubscriptionToken};
pub use transaction::{ReadTransaction, ReadWriteTransaction};
pub use watcher::GraphQLQueryWatcher;
