// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Normalized cache factory
//!
//! Builds a backend from a [`StorageType`] and an optional path.

use super::memory::InMemoryNormalizedCache;
use super::traits::NormalizedCache;
use super::types::{StorageDriverError, StorageResult, StorageType};
use std::path::Path;
use std::sync::Arc;

/// Create a normalized cache backend
///
/// # Arguments
/// * `storage_type` - Which backend to create
/// * `path` - Database directory; required for sled, ignored for memory
///
/// # Examples
/// ```ignore
/// let cache = create_normalized_cache(StorageType::Sled, Some("./cache"))?;
/// let changed = cache.merge(records)?;
/// ```
pub fn create_normalized_cache<P: AsRef<Path>>(
    storage_type: StorageType,
    path: Option<P>,
) -> StorageResult<Arc<dyn NormalizedCache>> {
    match storage_type {
        StorageType::Memory => Ok(Arc::new(InMemoryNormalizedCache::new())),
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            use super::sled::SledNormalizedCache;
            let path = path.ok_or_else(|| {
                StorageDriverError::InvalidConfiguration(
                    "sled backend requires a path".to_string(),
                )
            })?;
            log::info!(
                "Opening sled normalized cache at {}",
                path.as_ref().display()
            );
            Ok(Arc::new(SledNormalizedCache::open(path)?))
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => {
            let _ = path;
            Err(StorageDriverError::InvalidConfiguration(
                "sled backend not compiled in (enable the `sled-backend` feature)".to_string(),
            ))
        }
    }
}
