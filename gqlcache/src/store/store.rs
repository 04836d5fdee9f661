// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The normalized store
//!
//! Owns a backend, serializes writers against readers and notifies subscribers of changed
//! field addresses once a write has completed.

use super::config::StoreConfig;
use super::subscription::{StoreSubscriber, SubscriptionToken};
use super::transaction::{ReadTransaction, ReadWriteTransaction};
use crate::cache::{CacheKey, CacheKeyResolver};
use crate::exec::ExecutionError;
use crate::response::GraphQLResult;
use crate::selection::{Operation, Variables};
use crate::storage::{
    create_normalized_cache, InMemoryNormalizedCache, NormalizedCache, RecordSet,
    StorageDriverError,
};
use crate::txn::{AccessMode, ReaderWriterLock, TransactionGuard};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

type Subscribers = BTreeMap<SubscriptionToken, Arc<dyn StoreSubscriber>>;

/// Transactional normalized cache
pub struct Store {
    id: u64,
    cache: Arc<dyn NormalizedCache>,
    lock: ReaderWriterLock,
    subscribers: Mutex<Subscribers>,
    next_token: AtomicU64,
    config: StoreConfig,
    resolver: CacheKeyResolver,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryNormalizedCache::new()))
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("storage_type", &self.cache.storage_type())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl Store {
    /// Store over `cache` with the default configuration
    pub fn new(cache: Arc<dyn NormalizedCache>) -> Self {
        Self::with_config(cache, StoreConfig::default())
    }

    /// Store over `cache`, taking key fields and lock tuning from `config`
    pub fn with_config(cache: Arc<dyn NormalizedCache>, config: StoreConfig) -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            lock: ReaderWriterLock::with_spin_limit(config.lock_spin_limit),
            resolver: config.cache_key_resolver(),
            cache,
            subscribers: Mutex::new(BTreeMap::new()),
            next_token: AtomicU64::new(1),
            config,
        }
    }

    /// Create the backend described by `config` and open a store over it
    pub fn open(config: StoreConfig) -> Result<Self, ExecutionError> {
        config
            .validate()
            .map_err(StorageDriverError::InvalidConfiguration)?;
        let cache = create_normalized_cache(config.storage_type, config.path.as_ref())?;
        log::info!("Opened {} store", config.storage_type);
        Ok(Self::with_config(cache, config))
    }

    /// Replace how objects are identified
    pub fn with_cache_key_resolver(mut self, resolver: CacheKeyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn cache_key_resolver(&self) -> &CacheKeyResolver {
        &self.resolver
    }

    pub(crate) fn cache(&self) -> Arc<dyn NormalizedCache> {
        Arc::clone(&self.cache)
    }

    /// Every stored record
    pub fn records(&self) -> Result<RecordSet, ExecutionError> {
        self.within_read_transaction(|_| Ok(self.cache.all_records()?))
    }

    /// Run `body` with shared access. Any number of read transactions may run at once.
    pub fn within_read_transaction<T, F>(&self, body: F) -> Result<T, ExecutionError>
    where
        F: FnOnce(&ReadTransaction<'_>) -> Result<T, ExecutionError>,
    {
        let _guard = TransactionGuard::enter(self.id, AccessMode::ReadOnly)?;
        let _lock = self.lock.read();
        let transaction = ReadTransaction::new(self);
        log::trace!("{}: begin read", transaction.id());
        let result = body(&transaction);
        log::trace!("{}: end read", transaction.id());
        result
    }

    /// Run `body` with exclusive access, then notify subscribers of what changed.
    ///
    /// Changes made before `body` fails stay in the store and are still published.
    pub fn within_read_write_transaction<T, F>(&self, body: F) -> Result<T, ExecutionError>
    where
        F: FnOnce(&mut ReadWriteTransaction<'_>) -> Result<T, ExecutionError>,
    {
        self.perform_write(None, body)
    }

    fn perform_write<T, F>(&self, context_identifier: Option<Uuid>, body: F) -> Result<T, ExecutionError>
    where
        F: FnOnce(&mut ReadWriteTransaction<'_>) -> Result<T, ExecutionError>,
    {
        let (result, changed_keys) = {
            let _guard = TransactionGuard::enter(self.id, AccessMode::ReadWrite)?;
            let _lock = self.lock.write();
            let mut transaction = ReadWriteTransaction::new(self);
            log::trace!("{}: begin read-write", transaction.id());
            let result = body(&mut transaction);
            log::trace!("{}: end read-write", transaction.id());
            (result, transaction.into_changed_keys())
        };

        if !changed_keys.is_empty() {
            self.did_change_keys(&changed_keys, context_identifier);
        }
        result
    }

    /// Read `operation` in its own read transaction
    pub fn load(
        &self,
        operation: &Operation,
        variables: &Variables,
    ) -> Result<GraphQLResult, ExecutionError> {
        self.within_read_transaction(|transaction| transaction.read(operation, variables))
    }

    /// Merge `records`, tagging the notification with `context_identifier`
    pub fn publish(
        &self,
        records: RecordSet,
        context_identifier: Option<Uuid>,
    ) -> Result<HashSet<CacheKey>, ExecutionError> {
        self.perform_write(context_identifier, |transaction| transaction.merge(records))
    }

    /// Remove every record and tell subscribers to refetch
    pub fn clear_cache(&self) -> Result<(), ExecutionError> {
        {
            let _guard = TransactionGuard::enter(self.id, AccessMode::ReadWrite)?;
            let _lock = self.lock.write();
            self.cache.clear()?;
        }
        log::info!("Cleared store {}", self.id);

        for subscriber in self.subscriber_snapshot() {
            subscriber.store_did_clear(self);
        }
        Ok(())
    }

    /// Register `subscriber` for change notifications
    pub fn subscribe(&self, subscriber: Arc<dyn StoreSubscriber>) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().insert(token, subscriber);
        log::debug!("Store {}: added {}", self.id, token);
        token
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let removed = self.subscribers.lock().remove(&token).is_some();
        if removed {
            log::debug!("Store {}: removed {}", self.id, token);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn subscriber_snapshot(&self) -> Vec<Arc<dyn StoreSubscriber>> {
        self.subscribers.lock().values().cloned().collect()
    }

    fn did_change_keys(&self, changed_keys: &HashSet<CacheKey>, context_identifier: Option<Uuid>) {
        let subscribers = self.subscriber_snapshot();
        log::debug!(
            "Store {}: {} keys changed, notifying {} subscribers",
            self.id,
            changed_keys.len(),
            subscribers.len()
        );
        for subscriber in subscribers {
            subscriber.store_did_change(self, changed_keys, context_identifier);
        }
    }
}
