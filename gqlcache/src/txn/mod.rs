// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction primitives
//!
//! - [`ReaderWriterLock`]: many readers or one writer per store
//! - [`TransactionId`], [`AccessMode`], [`TransactionGuard`]: identity and per-thread tracking

pub mod lock;
pub mod state;

pub use lock::{ReadGuard, ReaderWriterLock, WriteGuard, DEFAULT_SPIN_LIMIT};
pub use state::{AccessMode, TransactionGuard, TransactionId};
