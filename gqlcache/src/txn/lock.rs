// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reader/writer lock over a single atomic counter
//!
//! The counter holds the number of active readers, or [`WRITING`] while a writer holds the
//! lock. Readers only enter while no writer is active; a writer only enters when the count is
//! zero. Waiters spin briefly and then yield to the scheduler. There is no fairness guarantee.

use std::hint;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::thread;

/// Counter value while a writer holds the lock
pub const WRITING: isize = -1;

/// Spins before a waiter starts yielding
pub const DEFAULT_SPIN_LIMIT: u32 = 64;

#[derive(Debug)]
pub struct ReaderWriterLock {
    state: AtomicIsize,
    spin_limit: u32,
}

impl Default for ReaderWriterLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderWriterLock {
    pub fn new() -> Self {
        Self::with_spin_limit(DEFAULT_SPIN_LIMIT)
    }

    pub fn with_spin_limit(spin_limit: u32) -> Self {
        Self {
            state: AtomicIsize::new(0),
            spin_limit,
        }
    }

    /// Block until no writer is active, then register as a reader
    pub fn read(&self) -> ReadGuard<'_> {
        let mut spins = 0;
        loop {
            if let Some(guard) = self.try_read() {
                return guard;
            }
            self.backoff(&mut spins);
        }
    }

    /// Single attempt; may fail spuriously
    pub fn try_read(&self) -> Option<ReadGuard<'_>> {
        let current = self.state.load(Ordering::Relaxed);
        if current == WRITING {
            return None;
        }
        self.state
            .compare_exchange_weak(current, current + 1, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ReadGuard { lock: self })
    }

    /// Block until there are no readers and no writer, then hold the lock exclusively
    pub fn write(&self) -> WriteGuard<'_> {
        let mut spins = 0;
        loop {
            if let Some(guard) = self.try_write() {
                return guard;
            }
            self.backoff(&mut spins);
        }
    }

    /// Single attempt; may fail spuriously
    pub fn try_write(&self) -> Option<WriteGuard<'_>> {
        self.state
            .compare_exchange_weak(0, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| WriteGuard { lock: self })
    }

    /// Active readers; zero while a writer holds the lock
    pub fn readers(&self) -> usize {
        self.state.load(Ordering::Relaxed).max(0) as usize
    }

    pub fn is_write_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) == WRITING
    }

    fn backoff(&self, spins: &mut u32) {
        if *spins < self.spin_limit {
            *spins += 1;
            hint::spin_loop();
        } else {
            thread::yield_now();
        }
    }
}

/// Shared access, released on drop
#[derive(Debug)]
pub struct ReadGuard<'l> {
    lock: &'l ReaderWriterLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.state.fetch_sub(1, Ordering::Release);
    }
}

/// Exclusive access, released on drop
#[derive(Debug)]
pub struct WriteGuard<'l> {
    lock: &'l ReaderWriterLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.state.store(0, Ordering::Release);
    }
}
