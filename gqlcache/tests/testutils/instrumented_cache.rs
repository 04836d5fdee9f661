//! Backend wrapper observing how the store drives it

use gqlcache::storage::{
    InMemoryNormalizedCache, NormalizedCache, RecordRow, RecordSet, StorageResult, StorageType,
};
use gqlcache::CacheKey;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// In-memory backend that counts batch loads and flags reads overlapping writes
#[derive(Default)]
pub struct InstrumentedCache {
    inner: InMemoryNormalizedCache,
    load_calls: AtomicUsize,
    loaded_keys: AtomicUsize,
    active_reads: AtomicUsize,
    active_writes: AtomicUsize,
    overlap: AtomicBool,
    hold: Option<Duration>,
}

impl InstrumentedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every access open for `hold` to widen race windows
    pub fn holding(hold: Duration) -> Self {
        Self {
            hold: Some(hold),
            ..Self::default()
        }
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn loaded_keys(&self) -> usize {
        self.loaded_keys.load(Ordering::SeqCst)
    }

    pub fn reset_counts(&self) {
        self.load_calls.store(0, Ordering::SeqCst);
        self.loaded_keys.store(0, Ordering::SeqCst);
    }

    /// Whether a write ever ran alongside another read or write
    pub fn saw_overlap(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }

    fn pause(&self) {
        if let Some(hold) = self.hold {
            thread::sleep(hold);
        }
    }
}

impl NormalizedCache for InstrumentedCache {
    fn load_records(&self, keys: &[CacheKey]) -> StorageResult<Vec<Option<RecordRow>>> {
        self.active_reads.fetch_add(1, Ordering::SeqCst);
        if self.active_writes.load(Ordering::SeqCst) > 0 {
            self.overlap.store(true, Ordering::SeqCst);
        }
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.loaded_keys.fetch_add(keys.len(), Ordering::SeqCst);
        self.pause();
        let rows = self.inner.load_records(keys);
        self.active_reads.fetch_sub(1, Ordering::SeqCst);
        rows
    }

    fn merge(&self, records: RecordSet) -> StorageResult<HashSet<CacheKey>> {
        let writers = self.active_writes.fetch_add(1, Ordering::SeqCst);
        if writers > 0 || self.active_reads.load(Ordering::SeqCst) > 0 {
            self.overlap.store(true, Ordering::SeqCst);
        }
        self.pause();
        let changed = self.inner.merge(records);
        self.active_writes.fetch_sub(1, Ordering::SeqCst);
        changed
    }

    fn remove_record(&self, key: &str) -> StorageResult<()> {
        self.inner.remove_record(key)
    }

    fn remove_records(&self, pattern: &str) -> StorageResult<()> {
        self.inner.remove_records(pattern)
    }

    fn clear(&self) -> StorageResult<()> {
        self.inner.clear()
    }

    fn all_records(&self) -> StorageResult<RecordSet> {
        self.inner.all_records()
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}
