// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use super::context::ResponsePath;
use crate::storage::persistent::types::StorageDriverError;
use thiserror::Error;

/// Errors raised while executing a selection set or running a store transaction.
///
/// Engine errors are wrapped in [`ExecutionError::AtPath`] exactly once, by the first field
/// that observes them. Use [`ExecutionError::kind`] to match on the underlying failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Missing value")]
    MissingValue,

    #[error("Unexpected null value")]
    UnexpectedNull,

    #[error("Wrong type: expected {expected}, found {found}")]
    WrongType { expected: String, found: String },

    #[error("Variable not provided: {0}")]
    VariableNotProvided(String),

    #[error("Transaction state error: {0}")]
    TransactionState(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Error at path \"{path}\": {source}")]
    AtPath {
        path: ResponsePath,
        source: Box<ExecutionError>,
    },
}

impl ExecutionError {
    pub(crate) fn wrong_type(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ExecutionError::WrongType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Attach a response path unless one is already attached.
    pub fn tagged(self, path: &ResponsePath) -> Self {
        match self {
            ExecutionError::AtPath { .. } => self,
            other => ExecutionError::AtPath {
                path: path.clone(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any path tag stripped
    pub fn kind(&self) -> &ExecutionError {
        match self {
            ExecutionError::AtPath { source, .. } => source.kind(),
            other => other,
        }
    }

    /// Response path the error was tagged with, if any
    pub fn path(&self) -> Option<&ResponsePath> {
        match self {
            ExecutionError::AtPath { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<StorageDriverError> for ExecutionError {
    fn from(error: StorageDriverError) -> Self {
        ExecutionError::StorageError(error.to_string())
    }
}

impl From<serde_json::Error> for ExecutionError {
    fn from(error: serde_json::Error) -> Self {
        ExecutionError::InvalidResponse(error.to_string())
    }
}
