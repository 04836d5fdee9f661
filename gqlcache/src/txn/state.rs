// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction identity and per-thread bookkeeping
//!
//! The reader/writer lock is not reentrant for writers, so a thread asking for a write while
//! it already holds a transaction on the same store would spin forever. [`TransactionGuard`]
//! tracks which transactions the current thread holds and refuses those requests up front.

use crate::exec::ExecutionError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Next identifier from a process-wide counter
    pub fn new() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying ID value
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// Transaction access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessMode::ReadOnly => write!(f, "read-only"),
            AccessMode::ReadWrite => write!(f, "read-write"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct HeldTransactions {
    readers: usize,
    writing: bool,
}

thread_local! {
    static HELD: RefCell<HashMap<u64, HeldTransactions>> = RefCell::new(HashMap::new());
}

/// Marks a transaction on `store_id` as held by the current thread until dropped
#[derive(Debug)]
pub struct TransactionGuard {
    store_id: u64,
    mode: AccessMode,
}

impl TransactionGuard {
    /// Register a transaction, or fail if taking the lock would deadlock this thread
    pub fn enter(store_id: u64, mode: AccessMode) -> Result<Self, ExecutionError> {
        HELD.with(|held| {
            let mut held = held.borrow_mut();
            let entry = held.entry(store_id).or_default();
            if entry.writing {
                return Err(ExecutionError::TransactionState(format!(
                    "cannot begin a {} transaction inside a read-write transaction on the same store",
                    mode
                )));
            }
            match mode {
                AccessMode::ReadWrite if entry.readers > 0 => {
                    Err(ExecutionError::TransactionState(
                        "cannot begin a read-write transaction inside a read transaction on the same store"
                            .to_string(),
                    ))
                }
                AccessMode::ReadWrite => {
                    entry.writing = true;
                    Ok(Self { store_id, mode })
                }
                AccessMode::ReadOnly => {
                    entry.readers += 1;
                    Ok(Self { store_id, mode })
                }
            }
        })
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        let _ = HELD.try_with(|held| {
            let mut held = held.borrow_mut();
            if let Some(entry) = held.get_mut(&self.store_id) {
                match self.mode {
                    AccessMode::ReadOnly => entry.readers = entry.readers.saturating_sub(1),
                    AccessMode::ReadWrite => entry.writing = false,
                }
                if entry.readers == 0 && !entry.writing {
                    held.remove(&self.store_id);
                }
            }
        });
    }
}
