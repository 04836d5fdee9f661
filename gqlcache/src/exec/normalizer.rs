// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Normalization into records
//!
//! Every object becomes a [`Record`] keyed by its cache path (or identity key) and is replaced
//! in its parent by a reference.

use super::accumulator::ResultAccumulator;
use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::error::ExecutionError;
use crate::cache::CacheReference;
use crate::selection::ScalarType;
use crate::storage::{Record, RecordSet, RecordValue};
use crate::JsonValue;
use std::cell::RefCell;

/// Accumulator producing the [`RecordSet`] for a response
#[derive(Debug, Default)]
pub struct ResultNormalizer {
    records: RefCell<RecordSet>,
}

impl ResultNormalizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultAccumulator for ResultNormalizer {
    type PartialResult = RecordValue;
    type FieldEntry = (String, RecordValue);
    type ObjectResult = CacheReference;
    type FinalResult = RecordSet;

    fn accept_scalar(
        &self,
        value: &JsonValue,
        _scalar_type: &ScalarType,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<RecordValue, ExecutionError> {
        Ok(RecordValue::Scalar(value.clone()))
    }

    fn accept_null(&self, _info: &FieldExecutionInfo<'_>) -> Result<RecordValue, ExecutionError> {
        Ok(RecordValue::null())
    }

    fn accept_list(
        &self,
        list: Vec<RecordValue>,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<RecordValue, ExecutionError> {
        Ok(RecordValue::List(list))
    }

    fn accept_child_object(
        &self,
        object: CacheReference,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<RecordValue, ExecutionError> {
        Ok(RecordValue::Reference(object))
    }

    fn accept_field_entry(
        &self,
        value: RecordValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<(String, RecordValue), ExecutionError> {
        Ok((info.cache_key.clone(), value))
    }

    fn accept_field_entries(
        &self,
        entries: Vec<(String, RecordValue)>,
        info: &ObjectExecutionInfo<'_>,
    ) -> Result<CacheReference, ExecutionError> {
        let key = info.cache_key();
        let record = Record::with_fields(key.clone(), entries.into_iter().collect());
        self.records.borrow_mut().merge_record(record);
        Ok(CacheReference::new(key))
    }

    fn finish(
        &self,
        _root: CacheReference,
        _info: &ObjectExecutionInfo<'_>,
    ) -> Result<RecordSet, ExecutionError> {
        Ok(self.records.take())
    }
}
