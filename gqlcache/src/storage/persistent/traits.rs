// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Normalized cache backend trait
//!
//! Every backend must report changed field addresses exactly as
//! [`RecordSet::merge`](crate::storage::RecordSet::merge) does; watchers depend on it.

use super::types::{StorageResult, StorageType};
use crate::cache::CacheKey;
use crate::storage::record::{RecordRow, RecordSet};
use std::collections::HashSet;

/// Storage for normalized records
///
/// Methods take `&self`; the store serializes writers against readers, so backends only need
/// enough interior locking to be `Sync`.
pub trait NormalizedCache: Send + Sync {
    /// Load rows for `keys`, in the same order, `None` for misses
    fn load_records(&self, keys: &[CacheKey]) -> StorageResult<Vec<Option<RecordRow>>>;

    /// Merge records, returning the addresses of fields that changed
    fn merge(&self, records: RecordSet) -> StorageResult<HashSet<CacheKey>>;

    /// Remove the record stored under `key`
    fn remove_record(&self, key: &str) -> StorageResult<()>;

    /// Remove every record whose key contains `pattern`, ignoring case
    fn remove_records(&self, pattern: &str) -> StorageResult<()>;

    /// Remove every record
    fn clear(&self) -> StorageResult<()>;

    /// Every stored record, for inspection and export
    fn all_records(&self) -> StorageResult<RecordSet>;

    fn storage_type(&self) -> StorageType;

    /// Flush any pending writes to disk
    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}
