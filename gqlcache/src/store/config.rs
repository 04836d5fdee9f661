// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Store configuration

use crate::cache::CacheKeyResolver;
use crate::storage::StorageType;
use crate::txn::DEFAULT_SPIN_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend holding the records
    pub storage_type: StorageType,

    /// Database directory for on-disk backends
    pub path: Option<PathBuf>,

    /// Fields identifying an object together with `__typename`; empty keys objects by path
    pub cache_key_fields: Vec<String>,

    /// Spins before a waiting transaction starts yielding
    pub lock_spin_limit: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Memory,
            path: None,
            cache_key_fields: Vec::new(),
            lock_spin_limit: DEFAULT_SPIN_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Process-local store keyed by response path
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Sled-backed store at `path`
    pub fn persistent<P: AsRef<Path>>(path: P) -> Self {
        Self {
            storage_type: StorageType::Sled,
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Key objects by `__typename` plus the given fields
    pub fn with_cache_key_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache_key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn cache_key_resolver(&self) -> CacheKeyResolver {
        if self.cache_key_fields.is_empty() {
            CacheKeyResolver::ResponsePath
        } else {
            CacheKeyResolver::key_fields(self.cache_key_fields.iter().cloned())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.storage_type == StorageType::Sled && self.path.is_none() {
            return Err("The sled backend requires a path".to_string());
        }

        if self.cache_key_fields.iter().any(|field| field.is_empty()) {
            return Err("Cache key fields must not be empty strings".to_string());
        }

        Ok(())
    }
}
