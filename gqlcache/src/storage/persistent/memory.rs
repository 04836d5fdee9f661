// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory normalized cache

use super::traits::NormalizedCache;
use super::types::{StorageResult, StorageType};
use crate::cache::CacheKey;
use crate::storage::record::{RecordRow, RecordSet};
use parking_lot::RwLock;
use std::collections::HashSet;

/// Records held in a process-local [`RecordSet`]
#[derive(Debug, Default)]
pub struct InMemoryNormalizedCache {
    records: RwLock<RecordSet>,
}

impl InMemoryNormalizedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-populated with `records`
    pub fn with_records(records: RecordSet) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl NormalizedCache for InMemoryNormalizedCache {
    fn load_records(&self, keys: &[CacheKey]) -> StorageResult<Vec<Option<RecordRow>>> {
        let records = self.records.read();
        Ok(keys.iter().map(|key| records.row(key).cloned()).collect())
    }

    fn merge(&self, records: RecordSet) -> StorageResult<HashSet<CacheKey>> {
        Ok(self.records.write().merge(records))
    }

    fn remove_record(&self, key: &str) -> StorageResult<()> {
        self.records.write().remove_record(key);
        Ok(())
    }

    fn remove_records(&self, pattern: &str) -> StorageResult<()> {
        self.records.write().remove_records(pattern);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.records.write().clear();
        Ok(())
    }

    fn all_records(&self) -> StorageResult<RecordSet> {
        Ok(self.records.read().clone())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::Record;
    use serde_json::json;

    #[test]
    fn test_load_preserves_order_and_misses() {
        let cache = InMemoryNormalizedCache::with_records(RecordSet::from_records(vec![
            Record::new("A").with_field("x", json!(1)),
            Record::new("B").with_field("x", json!(2)),
        ]));

        let rows = cache
            .load_records(&["B".to_string(), "missing".to_string(), "A".to_string()])
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_ref().map(RecordRow::key), Some("B"));
        assert!(rows[1].is_none());
        assert_eq!(rows[2].as_ref().map(RecordRow::key), Some("A"));
    }

    #[test]
    fn test_merge_reports_changes() {
        let cache = InMemoryNormalizedCache::new();
        let first = cache
            .merge(RecordSet::from_records(vec![
                Record::new("A").with_field("x", json!(1))
            ]))
            .unwrap();
        let second = cache
            .merge(RecordSet::from_records(vec![
                Record::new("A").with_field("x", json!(1))
            ]))
            .unwrap();

        assert!(first.contains("A.x"));
        assert!(second.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = InMemoryNormalizedCache::with_records(RecordSet::from_records(vec![
            Record::new("QUERY_ROOT.hero").with_field("name", json!("R2-D2")),
            Record::new("QUERY_ROOT.hero.friends.0").with_field("name", json!("Luke")),
            Record::new("QUERY_ROOT").with_field("hero", json!(null)),
        ]));

        cache.remove_record("QUERY_ROOT").unwrap();
        assert_eq!(cache.all_records().unwrap().len(), 2);

        cache.remove_records("FRIENDS").unwrap();
        assert_eq!(cache.all_records().unwrap().keys(), vec!["QUERY_ROOT.hero"]);

        cache.clear().unwrap();
        assert!(cache.all_records().unwrap().is_empty());
    }
}
