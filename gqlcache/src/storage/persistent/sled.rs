// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled normalized cache implementation

use super::traits::NormalizedCache;
use super::types::{StorageDriverError, StorageResult, StorageType};
use crate::cache::CacheKey;
use crate::storage::record::{RecordRow, RecordSet};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const RECORDS_TREE: &str = "records";

/// Records stored as JSON-encoded rows in a sled tree, keyed by cache key
pub struct SledNormalizedCache {
    db: sled::Db,
    records: sled::Tree,
}

fn backend_error(e: sled::Error) -> StorageDriverError {
    StorageDriverError::BackendSpecific(e.to_string())
}

impl SledNormalizedCache {
    /// Open or create a cache at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path).map_err(backend_error)?;
        let records = db.open_tree(RECORDS_TREE).map_err(backend_error)?;
        Ok(Self { db, records })
    }

    fn get_row(&self, key: &str) -> StorageResult<Option<RecordRow>> {
        match self.records.get(key.as_bytes()).map_err(backend_error)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl NormalizedCache for SledNormalizedCache {
    fn load_records(&self, keys: &[CacheKey]) -> StorageResult<Vec<Option<RecordRow>>> {
        let mut rows = Vec::with_capacity(keys.len());
        for key in keys {
            rows.push(self.get_row(key)?);
        }
        Ok(rows)
    }

    fn merge(&self, records: RecordSet) -> StorageResult<HashSet<CacheKey>> {
        let mut changed = HashSet::new();
        let mut updated: HashMap<CacheKey, RecordRow> = HashMap::new();

        for record in records.into_records() {
            let existing = match updated.remove(&record.key) {
                Some(row) => Some(row),
                None => self.get_row(&record.key)?,
            };
            let row = match existing {
                Some(mut row) => {
                    let fields_changed = row.merge(record);
                    if fields_changed.is_empty() {
                        continue;
                    }
                    changed.extend(fields_changed);
                    row
                }
                None => {
                    let row = RecordRow::new(record);
                    changed.extend(row.all_field_addresses());
                    row
                }
            };
            updated.insert(row.record.key.clone(), row);
        }

        if updated.is_empty() {
            return Ok(changed);
        }

        let mut batch = sled::Batch::default();
        for (key, row) in &updated {
            batch.insert(key.as_bytes(), serde_json::to_vec(row)?);
        }
        self.records.apply_batch(batch).map_err(backend_error)?;
        log::debug!(
            "SledNormalizedCache: wrote {} rows, {} fields changed",
            updated.len(),
            changed.len()
        );

        Ok(changed)
    }

    fn remove_record(&self, key: &str) -> StorageResult<()> {
        self.records.remove(key.as_bytes()).map_err(backend_error)?;
        Ok(())
    }

    fn remove_records(&self, pattern: &str) -> StorageResult<()> {
        let pattern = pattern.to_lowercase();
        let mut batch = sled::Batch::default();
        for entry in self.records.iter() {
            let (key, _) = entry.map_err(backend_error)?;
            if String::from_utf8_lossy(&key).to_lowercase().contains(&pattern) {
                batch.remove(key);
            }
        }
        self.records.apply_batch(batch).map_err(backend_error)
    }

    fn clear(&self) -> StorageResult<()> {
        self.records.clear().map_err(backend_error)
    }

    fn all_records(&self) -> StorageResult<RecordSet> {
        let mut set = RecordSet::new();
        for entry in self.records.iter() {
            let (_, bytes) = entry.map_err(backend_error)?;
            let row: RecordRow = serde_json::from_slice(&bytes)?;
            set.insert_row(row);
        }
        Ok(set)
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush().map_err(backend_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::Record;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_merge_semantics_match_record_set() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SledNormalizedCache::open(temp_dir.path()).unwrap();

        let first = cache
            .merge(RecordSet::from_records(vec![Record::new("A")
                .with_field("x", json!(1))
                .with_field("y", json!(2))]))
            .unwrap();
        assert_eq!(first.len(), 2);

        let second = cache
            .merge(RecordSet::from_records(vec![Record::new("A")
                .with_field("y", json!(3))]))
            .unwrap();
        assert_eq!(second, HashSet::from(["A.y".to_string()]));

        let rows = cache.load_records(&["A".to_string()]).unwrap();
        let record = &rows[0].as_ref().unwrap().record;
        assert_eq!(record.get("x"), Some(&json!(1).into()));
        assert_eq!(record.get("y"), Some(&json!(3).into()));
    }

    #[test]
    fn test_remerging_floats_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SledNormalizedCache::open(temp_dir.path()).unwrap();
        let record = || Record::new("A").with_field("x", json!(1.9120896581877294e-5_f64));

        let first = cache.merge(RecordSet::from_records(vec![record()])).unwrap();
        let second = cache.merge(RecordSet::from_records(vec![record()])).unwrap();

        assert_eq!(first, HashSet::from(["A.x".to_string()]));
        assert!(second.is_empty());
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let cache = SledNormalizedCache::open(temp_dir.path()).unwrap();
            cache
                .merge(RecordSet::from_records(vec![
                    Record::new("QUERY_ROOT").with_field("hero", crate::storage::RecordValue::reference("QUERY_ROOT.hero"))
                ]))
                .unwrap();
            cache.flush().unwrap();
        }

        let cache = SledNormalizedCache::open(temp_dir.path()).unwrap();
        let records = cache.all_records().unwrap();
        assert_eq!(
            records.record("QUERY_ROOT").and_then(|r| r.get("hero")),
            Some(&crate::storage::RecordValue::reference("QUERY_ROOT.hero"))
        );
    }

    #[test]
    fn test_remove_records_by_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SledNormalizedCache::open(temp_dir.path()).unwrap();
        cache
            .merge(RecordSet::from_records(vec![
                Record::new("Droid:2001").with_field("name", json!("R2-D2")),
                Record::new("Human:1000").with_field("name", json!("Luke")),
            ]))
            .unwrap();

        cache.remove_records("droid").unwrap();

        assert_eq!(cache.all_records().unwrap().keys(), vec!["Human:1000"]);
    }
}
