// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for gqlcache
//!
//! Normalizes saved server responses into an on-disk store, reads operations back, and
//! inspects or prunes the stored records.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_clear, handle_normalize, handle_read, handle_records, handle_remove};
