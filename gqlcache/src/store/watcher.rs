// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query watchers
//!
//! A watcher remembers which addresses its last result was built from and reads its operation
//! again whenever a write touches one of them.

use super::store::Store;
use super::subscription::{StoreSubscriber, SubscriptionToken};
use crate::cache::CacheKey;
use crate::exec::ExecutionError;
use crate::response::GraphQLResult;
use crate::selection::{Operation, Variables};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

type ResultHandler = dyn Fn(Result<GraphQLResult, ExecutionError>) + Send + Sync;

struct WatcherState {
    operation: Operation,
    variables: Variables,
    context_identifier: Uuid,
    dependent_keys: Mutex<Option<HashSet<CacheKey>>>,
    handler: Box<ResultHandler>,
}

impl WatcherState {
    fn fetch(&self, store: &Store) {
        let result = store.load(&self.operation, &self.variables);
        match &result {
            Ok(loaded) => *self.dependent_keys.lock() = loaded.dependent_keys.clone(),
            Err(error) => log::debug!(
                "Watcher for {} {} failed to read: {}",
                self.operation.kind,
                self.operation.name,
                error
            ),
        }
        (self.handler)(result);
    }
}

impl StoreSubscriber for WatcherState {
    fn store_did_change(
        &self,
        store: &Store,
        changed_keys: &HashSet<CacheKey>,
        context_identifier: Option<Uuid>,
    ) {
        if context_identifier == Some(self.context_identifier) {
            return;
        }

        let affected = match &*self.dependent_keys.lock() {
            Some(dependent_keys) => !dependent_keys.is_disjoint(changed_keys),
            None => false,
        };
        if affected {
            log::debug!(
                "Watcher for {} {} refetching",
                self.operation.kind,
                self.operation.name
            );
            self.fetch(store);
        }
    }

    fn store_did_clear(&self, store: &Store) {
        self.fetch(store);
    }
}

/// Delivers the cached result of an operation now and after every relevant change.
///
/// Dropping the watcher unsubscribes it.
pub struct GraphQLQueryWatcher {
    store: Arc<Store>,
    state: Arc<WatcherState>,
    token: Option<SubscriptionToken>,
}

impl GraphQLQueryWatcher {
    /// Subscribe to `store` for `operation`; call [`fetch`](Self::fetch) for the first result
    pub fn new<F>(store: Arc<Store>, operation: Operation, variables: Variables, handler: F) -> Self
    where
        F: Fn(Result<GraphQLResult, ExecutionError>) + Send + Sync + 'static,
    {
        let state = Arc::new(WatcherState {
            operation,
            variables,
            context_identifier: Uuid::new_v4(),
            dependent_keys: Mutex::new(None),
            handler: Box::new(handler),
        });
        let token = store.subscribe(Arc::clone(&state) as Arc<dyn StoreSubscriber>);
        Self {
            store,
            state,
            token: Some(token),
        }
    }

    /// Read the operation from the store and hand the result to the handler
    pub fn fetch(&self) {
        self.state.fetch(&self.store);
    }

    /// Identifier to publish with when writing this watcher's own results
    pub fn context_identifier(&self) -> Uuid {
        self.state.context_identifier
    }

    /// Addresses the last successful read depended on
    pub fn dependent_keys(&self) -> Option<HashSet<CacheKey>> {
        self.state.dependent_keys.lock().clone()
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            self.store.unsubscribe(token);
        }
    }
}

impl Drop for GraphQLQueryWatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
