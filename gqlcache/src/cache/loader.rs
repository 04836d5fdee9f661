// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Batched, memoizing loader
//!
//! A loader lives for one transaction and is never shared across threads. Keys requested
//! before any thunk is forced are fetched together in a single batch call.

use crate::exec::{ExecutionError, PossiblyDeferred};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

type BatchLoad<K, V> = Box<dyn Fn(&[K]) -> Result<Vec<V>, ExecutionError>>;

struct LoaderState<K, V> {
    memo: HashMap<K, Result<V, ExecutionError>>,
    pending: Vec<K>,
    pending_set: HashSet<K>,
}

struct LoaderInner<K, V> {
    batch_load: BatchLoad<K, V>,
    state: RefCell<LoaderState<K, V>>,
}

/// Coalescing loader over a batch function returning one value per key, in key order
pub struct DataLoader<K, V> {
    inner: Rc<LoaderInner<K, V>>,
}

impl<K, V> Clone for DataLoader<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> DataLoader<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    pub fn new<F>(batch_load: F) -> Self
    where
        F: Fn(&[K]) -> Result<Vec<V>, ExecutionError> + 'static,
    {
        Self {
            inner: Rc::new(LoaderInner {
                batch_load: Box::new(batch_load),
                state: RefCell::new(LoaderState {
                    memo: HashMap::new(),
                    pending: Vec::new(),
                    pending_set: HashSet::new(),
                }),
            }),
        }
    }

    /// Value for `key`: immediate when memoized, otherwise a thunk that loads every pending key
    pub fn get<'a>(&self, key: K) -> PossiblyDeferred<'a, V> {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(result) = state.memo.get(&key) {
                return PossiblyDeferred::Immediate(result.clone());
            }
            if state.pending_set.insert(key.clone()) {
                state.pending.push(key.clone());
            }
        }

        let inner = Rc::clone(&self.inner);
        PossiblyDeferred::deferred(move || inner.load(key))
    }

    /// Forget every memoized value. Pending keys stay pending.
    pub fn remove_all(&self) {
        self.inner.state.borrow_mut().memo.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.inner.state.borrow().pending.len()
    }
}

impl<K, V> LoaderInner<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn load(&self, key: K) -> Result<V, ExecutionError> {
        if let Some(result) = self.state.borrow().memo.get(&key) {
            return result.clone();
        }

        let mut keys = {
            let mut state = self.state.borrow_mut();
            state.pending_set.clear();
            std::mem::take(&mut state.pending)
        };
        if !keys.contains(&key) {
            keys.push(key.clone());
        }

        log::debug!("DataLoader: fetching batch of {} keys", keys.len());
        log::trace!("DataLoader: batch keys {:?}", keys);
        let loaded = (self.batch_load)(&keys).and_then(|values| {
            if values.len() == keys.len() {
                Ok(values)
            } else {
                Err(ExecutionError::StorageError(format!(
                    "batch load returned {} values for {} keys",
                    values.len(),
                    keys.len()
                )))
            }
        });

        let mut state = self.state.borrow_mut();
        match loaded {
            Ok(values) => {
                for (batch_key, value) in keys.into_iter().zip(values) {
                    state.memo.insert(batch_key, Ok(value));
                }
            }
            Err(error) => {
                log::warn!("DataLoader: batch of {} keys failed: {}", keys.len(), error);
                for batch_key in keys {
                    state.memo.insert(batch_key, Err(error.clone()));
                }
            }
        }

        state
            .memo
            .get(&key)
            .cloned()
            .unwrap_or(Err(ExecutionError::MissingValue))
    }
}
