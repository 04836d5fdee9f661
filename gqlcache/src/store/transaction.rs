// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read and read-write transactions
//!
//! A transaction owns a fresh record loader; loads issued while executing one operation are
//! batched and memoized until the transaction ends or writes something.

use super::store::Store;
use crate::cache::CacheKey;
use crate::exec::{
    CacheSource, DependencyTracker, ExecutionError, Executor, FirstReceivedAtTracker,
    FragmentTracker, JsonSource, ObjectExecutionInfo, RecordLoader, ResultNormalizer,
    SelectionSetMapper, Zip4,
};
use crate::response::{GraphQLResult, ResultMetadata, ResultSource};
use crate::selection::{Operation, Selection, Variables};
use crate::storage::{NormalizedCache, RecordSet};
use crate::txn::TransactionId;
use crate::JsonObject;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

fn record_loader(cache: Arc<dyn NormalizedCache>) -> RecordLoader {
    RecordLoader::new(move |keys: &[CacheKey]| {
        let rows = cache.load_records(keys)?;
        Ok(rows.into_iter().map(|row| row.map(Rc::new)).collect())
    })
}

/// Read access to a store
pub struct ReadTransaction<'s> {
    id: TransactionId,
    pub(crate) store: &'s Store,
    loader: RecordLoader,
}

impl<'s> ReadTransaction<'s> {
    pub(crate) fn new(store: &'s Store) -> Self {
        Self {
            id: TransactionId::new(),
            store,
            loader: record_loader(store.cache()),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Read the data for `operation` from the cache
    pub fn read(
        &self,
        operation: &Operation,
        variables: &Variables,
    ) -> Result<GraphQLResult, ExecutionError> {
        let root_key = operation.root_cache_key();
        let root = self
            .loader
            .get(root_key.to_string())
            .get()?
            .ok_or(ExecutionError::MissingValue)?;

        let source = CacheSource::new(self.loader.clone());
        let accumulator = Zip4::new(
            SelectionSetMapper::new(),
            DependencyTracker::new(),
            FirstReceivedAtTracker::new(),
            FragmentTracker::new(),
        );
        let info = ObjectExecutionInfo::root(root_key, variables);
        let (data, dependent_keys, first_received_at, fulfilled_fragments) =
            Executor::new(&source, &accumulator).execute(&root, &operation.selections, info)?;

        log::trace!(
            "{}: read {} {} ({} dependent keys)",
            self.id,
            operation.kind,
            operation.name,
            dependent_keys.len()
        );

        Ok(GraphQLResult {
            data: Some(data),
            errors: Vec::new(),
            extensions: None,
            source: ResultSource::Cache,
            dependent_keys: Some(dependent_keys),
            fulfilled_fragments,
            metadata: ResultMetadata { first_received_at },
        })
    }

    /// Read `selections` starting from the record stored under `key`
    pub fn read_object(
        &self,
        key: &str,
        selections: &[Selection],
        variables: &Variables,
    ) -> Result<JsonObject, ExecutionError> {
        let root = self
            .loader
            .get(key.to_string())
            .get()?
            .ok_or(ExecutionError::MissingValue)?;

        let source = CacheSource::new(self.loader.clone());
        let mapper = SelectionSetMapper::new();
        let info = ObjectExecutionInfo::root(key, variables);
        Executor::new(&source, &mapper).execute(&root, selections, info)
    }

    /// Read `operation` and decode its data into `T`
    pub fn read_typed<T: DeserializeOwned>(
        &self,
        operation: &Operation,
        variables: &Variables,
    ) -> Result<T, ExecutionError> {
        self.read(operation, variables)?.decode()
    }
}

/// Read and write access to a store, exclusive for its whole body
pub struct ReadWriteTransaction<'s> {
    inner: ReadTransaction<'s>,
    changed_keys: HashSet<CacheKey>,
}

impl<'s> Deref for ReadWriteTransaction<'s> {
    type Target = ReadTransaction<'s>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'s> ReadWriteTransaction<'s> {
    pub(crate) fn new(store: &'s Store) -> Self {
        Self {
            inner: ReadTransaction::new(store),
            changed_keys: HashSet::new(),
        }
    }

    /// Addresses changed so far by this transaction
    pub fn changed_keys(&self) -> &HashSet<CacheKey> {
        &self.changed_keys
    }

    pub(crate) fn into_changed_keys(self) -> HashSet<CacheKey> {
        self.changed_keys
    }

    /// Normalize `data` as the response to `operation` and merge it
    pub fn write(
        &mut self,
        data: &JsonObject,
        operation: &Operation,
        variables: &Variables,
    ) -> Result<(), ExecutionError> {
        self.write_object(data, operation.root_cache_key(), &operation.selections, variables)
    }

    /// Normalize `data` as the object stored under `key` and merge it
    pub fn write_object(
        &mut self,
        data: &JsonObject,
        key: &str,
        selections: &[Selection],
        variables: &Variables,
    ) -> Result<(), ExecutionError> {
        let resolver = self.inner.store.cache_key_resolver();
        let source = JsonSource::new(resolver);
        let normalizer = ResultNormalizer::new();
        let info = ObjectExecutionInfo::root(key, variables);
        let records = Executor::new(&source, &normalizer).execute(&data, selections, info)?;
        self.merge(records)?;
        Ok(())
    }

    /// Read `operation`, let `body` edit the data, and write the result back
    pub fn update<F>(
        &mut self,
        operation: &Operation,
        variables: &Variables,
        body: F,
    ) -> Result<(), ExecutionError>
    where
        F: FnOnce(&mut JsonObject) -> Result<(), ExecutionError>,
    {
        let mut data = self.read(operation, variables)?.data.unwrap_or_default();
        body(&mut data)?;
        self.write(&data, operation, variables)
    }

    /// Merge records into the backend, returning the changed addresses.
    ///
    /// References left pointing at records the store does not hold are logged as warnings.
    pub fn merge(&mut self, records: RecordSet) -> Result<HashSet<CacheKey>, ExecutionError> {
        let record_count = records.len();
        let outside = records.dangling_references();
        let cache = self.inner.store.cache();
        let changed = cache.merge(records)?;
        self.inner.loader.remove_all();

        if !outside.is_empty() {
            let rows = cache.load_records(&outside)?;
            for (key, row) in outside.iter().zip(rows) {
                if row.is_none() {
                    log::warn!("{}: merged a reference to missing record {}", self.inner.id, key);
                }
            }
        }
        log::debug!(
            "{}: merged {} records, {} fields changed",
            self.inner.id,
            record_count,
            changed.len()
        );
        self.changed_keys.extend(changed.iter().cloned());
        Ok(changed)
    }

    /// Remove the record stored under `key`. Subscribers are not notified.
    pub fn remove_object(&mut self, key: &str) -> Result<(), ExecutionError> {
        self.inner.store.cache().remove_record(key)?;
        self.inner.loader.remove_all();
        log::debug!("{}: removed record {}", self.inner.id, key);
        Ok(())
    }

    /// Remove every record whose key contains `pattern`, ignoring case. Subscribers are not
    /// notified.
    pub fn remove_objects(&mut self, pattern: &str) -> Result<(), ExecutionError> {
        self.inner.store.cache().remove_records(pattern)?;
        self.inner.loader.remove_all();
        log::debug!("{}: removed records matching {:?}", self.inner.id, pattern);
        Ok(())
    }
}
