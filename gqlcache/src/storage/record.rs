// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Records and record sets
//!
//! A [`RecordSet`] is the unit of persistence. Merging into it is strictly additive: fields
//! missing from an incoming record are kept, and only fields whose value actually changed are
//! reported back as `"<record key>.<field key>"` addresses.

use super::value::RecordValue;
use crate::cache::CacheKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Flat set of fields stored under one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: CacheKey,
    pub fields: BTreeMap<String, RecordValue>,
}

impl Record {
    pub fn new(key: impl Into<CacheKey>) -> Self {
        Self {
            key: key.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_fields(key: impl Into<CacheKey>, fields: BTreeMap<String, RecordValue>) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&RecordValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: RecordValue) {
        self.fields.insert(field.into(), value);
    }

    /// Address of one of this record's fields
    pub fn field_address(&self, field: &str) -> CacheKey {
        format!("{}.{}", self.key, field)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {{", self.key)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", name, value)?;
        }
        write!(f, " }}")
    }
}

/// A record plus the time it last changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub record: Record,
    pub last_received_at: DateTime<Utc>,
}

impl RecordRow {
    pub fn new(record: Record) -> Self {
        Self::received_at(record, Utc::now())
    }

    pub fn received_at(record: Record, last_received_at: DateTime<Utc>) -> Self {
        Self {
            record,
            last_received_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    /// Merge `incoming` field by field, returning the addresses that changed.
    ///
    /// The timestamp only moves when at least one field changed.
    pub fn merge(&mut self, incoming: Record) -> HashSet<CacheKey> {
        let mut changed = HashSet::new();
        for (field, value) in incoming.fields {
            if self.record.fields.get(&field) == Some(&value) {
                continue;
            }
            changed.insert(self.record.field_address(&field));
            self.record.fields.insert(field, value);
        }
        if !changed.is_empty() {
            self.last_received_at = Utc::now();
        }
        changed
    }

    /// Addresses of every field, as reported when the record is first inserted
    pub fn all_field_addresses(&self) -> HashSet<CacheKey> {
        self.record
            .fields
            .keys()
            .map(|field| self.record.field_address(field))
            .collect()
    }
}

/// Records by key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    storage: HashMap<CacheKey, RecordRow>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let mut set = Self::new();
        set.insert_all(records);
        set
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&CacheKey> {
        let mut keys: Vec<&CacheKey> = self.storage.keys().collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.storage.contains_key(key)
    }

    pub fn record(&self, key: &str) -> Option<&Record> {
        self.storage.get(key).map(|row| &row.record)
    }

    pub fn row(&self, key: &str) -> Option<&RecordRow> {
        self.storage.get(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = &RecordRow> {
        self.storage.values()
    }

    /// Replace the record stored under its key
    pub fn insert(&mut self, record: Record) {
        self.storage
            .insert(record.key.clone(), RecordRow::new(record));
    }

    pub fn insert_row(&mut self, row: RecordRow) {
        self.storage.insert(row.record.key.clone(), row);
    }

    pub fn insert_all<I: IntoIterator<Item = Record>>(&mut self, records: I) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn remove_record(&mut self, key: &str) -> Option<RecordRow> {
        self.storage.remove(key)
    }

    /// Remove every record whose key contains `pattern`, ignoring case
    pub fn remove_records(&mut self, pattern: &str) -> usize {
        let pattern = pattern.to_lowercase();
        let before = self.storage.len();
        self.storage
            .retain(|key, _| !key.to_lowercase().contains(&pattern));
        before - self.storage.len()
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Merge a single record, returning changed field addresses
    pub fn merge_record(&mut self, record: Record) -> HashSet<CacheKey> {
        match self.storage.get_mut(&record.key) {
            Some(row) => row.merge(record),
            None => {
                let row = RecordRow::new(record);
                let changed = row.all_field_addresses();
                self.storage.insert(row.record.key.clone(), row);
                changed
            }
        }
    }

    /// Merge every record of `records`, returning the union of changed addresses
    pub fn merge(&mut self, records: RecordSet) -> HashSet<CacheKey> {
        let mut changed = HashSet::new();
        for record in records.into_records() {
            changed.extend(self.merge_record(record));
        }
        changed
    }

    pub fn into_records(self) -> impl Iterator<Item = Record> {
        self.storage.into_values().map(|row| row.record)
    }

    /// Records sorted by key
    pub fn sorted_records(&self) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.storage.values().map(|row| &row.record).collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }

    /// References that point at keys missing from this set
    pub fn dangling_references(&self) -> Vec<CacheKey> {
        let mut dangling: Vec<CacheKey> = self
            .storage
            .values()
            .flat_map(|row| row.record.fields.values())
            .flat_map(RecordValue::references)
            .filter(|reference| !self.storage.contains_key(&reference.key))
            .map(|reference| reference.key.clone())
            .collect();
        dangling.sort();
        dangling.dedup();
        dangling
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in self.sorted_records() {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}
