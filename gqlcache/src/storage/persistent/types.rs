// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Backend selection and the error type shared by every backend

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where a store keeps its records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Process-local map, lost on exit
    #[default]
    Memory,

    /// Embedded sled database, survives restarts
    Sled,
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.eq_ignore_ascii_case("memory") {
            Ok(StorageType::Memory)
        } else if name.eq_ignore_ascii_case("sled") {
            Ok(StorageType::Sled)
        } else {
            Err(format!("Unknown storage type '{}' (expected memory or sled)", name))
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageType::Memory => "memory",
            StorageType::Sled => "sled",
        })
    }
}

/// Failure reported by a backend while loading, merging or removing records
#[derive(Error, Debug)]
pub enum StorageDriverError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Row could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error raised by the underlying database
    #[error("Storage driver error: {0}")]
    BackendSpecific(String),
}

impl From<serde_json::Error> for StorageDriverError {
    fn from(e: serde_json::Error) -> Self {
        StorageDriverError::SerializationError(e.to_string())
    }
}

/// Result type for backend operations
pub type StorageResult<T> = Result<T, StorageDriverError>;
