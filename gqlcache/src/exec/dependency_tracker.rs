// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dependent key tracking

use super::accumulator::ResultAccumulator;
use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::error::ExecutionError;
use crate::cache::CacheKey;
use crate::selection::ScalarType;
use crate::JsonValue;
use std::cell::RefCell;
use std::collections::HashSet;

/// Accumulator collecting the address of every field a result depends on.
///
/// Addresses use the same `"<record key>.<field key>"` format backends report as changed.
#[derive(Debug, Default)]
pub struct DependencyTracker {
    keys: RefCell<HashSet<CacheKey>>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultAccumulator for DependencyTracker {
    type PartialResult = ();
    type FieldEntry = ();
    type ObjectResult = ();
    type FinalResult = HashSet<CacheKey>;

    fn accept_scalar(
        &self,
        _value: &JsonValue,
        _scalar_type: &ScalarType,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn accept_null(&self, _info: &FieldExecutionInfo<'_>) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn accept_list(&self, _list: Vec<()>, _info: &FieldExecutionInfo<'_>) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn accept_child_object(&self, _object: (), _info: &FieldExecutionInfo<'_>) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn accept_field_entry(&self, _value: (), info: &FieldExecutionInfo<'_>) -> Result<(), ExecutionError> {
        self.keys.borrow_mut().insert(info.cache_path.joined());
        Ok(())
    }

    fn accept_field_entries(
        &self,
        _entries: Vec<()>,
        _info: &ObjectExecutionInfo<'_>,
    ) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn finish(&self, _root: (), _info: &ObjectExecutionInfo<'_>) -> Result<HashSet<CacheKey>, ExecutionError> {
        Ok(self.keys.take())
    }
}
