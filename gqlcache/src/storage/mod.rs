// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Record storage
//!
//! - [`RecordValue`]: what a single record field holds
//! - [`Record`], [`RecordRow`], [`RecordSet`]: records and their merge semantics
//! - [`persistent`]: backends implementing [`NormalizedCache`]

pub mod persistent;
pub mod record;
pub mod value;

pub use persistent::{
    create_normalized_cache, InMemoryNormalizedCache, NormalizedCache, StorageDriverError,
    StorageResult, StorageType,
};
pub use record::{Record, RecordRow, RecordSet};
pub use value::RecordValue;
