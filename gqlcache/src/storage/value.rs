// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value type system for record fields
//!
//! A record field holds one of:
//! - Scalars: any JSON value, including custom scalars encoded as objects
//! - Lists: of scalars, nested lists or references
//! - References: pointers to other records
//!
//! Objects are never nested inside a record; they are always stored as references.

use crate::cache::{CacheKey, CacheReference};
use crate::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordValue {
    Scalar(JsonValue),
    List(Vec<RecordValue>),
    Reference(CacheReference),
}

impl RecordValue {
    pub fn null() -> Self {
        RecordValue::Scalar(JsonValue::Null)
    }

    pub fn reference(key: impl Into<CacheKey>) -> Self {
        RecordValue::Reference(CacheReference::new(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RecordValue::Scalar(JsonValue::Null))
    }

    pub fn as_reference(&self) -> Option<&CacheReference> {
        match self {
            RecordValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Every reference reachable from this value, lists included
    pub fn references(&self) -> Vec<&CacheReference> {
        match self {
            RecordValue::Scalar(_) => Vec::new(),
            RecordValue::Reference(reference) => vec![reference],
            RecordValue::List(items) => items.iter().flat_map(RecordValue::references).collect(),
        }
    }

    /// Plain JSON rendering; references become `{"$ref": key}`
    pub fn to_json(&self) -> JsonValue {
        match self {
            RecordValue::Scalar(value) => value.clone(),
            RecordValue::List(items) => {
                JsonValue::Array(items.iter().map(RecordValue::to_json).collect())
            }
            RecordValue::Reference(reference) => {
                serde_json::json!({ "$ref": reference.key })
            }
        }
    }
}

impl From<JsonValue> for RecordValue {
    fn from(value: JsonValue) -> Self {
        RecordValue::Scalar(value)
    }
}

impl From<CacheReference> for RecordValue {
    fn from(reference: CacheReference) -> Self {
        RecordValue::Reference(reference)
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Scalar(value) => write!(f, "{}", value),
            RecordValue::Reference(reference) => write!(f, "{}", reference),
            RecordValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
