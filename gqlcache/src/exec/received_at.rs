// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Earliest received-at tracking for cache reads

use super::accumulator::ResultAccumulator;
use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::error::ExecutionError;
use crate::selection::ScalarType;
use crate::JsonValue;
use chrono::{DateTime, Utc};

type Timestamp = Option<DateTime<Utc>>;

fn earliest<I: IntoIterator<Item = Timestamp>>(timestamps: I) -> Timestamp {
    timestamps.into_iter().flatten().min()
}

/// Accumulator computing the oldest record timestamp a result was built from
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstReceivedAtTracker;

impl FirstReceivedAtTracker {
    pub fn new() -> Self {
        Self
    }
}

impl ResultAccumulator for FirstReceivedAtTracker {
    type PartialResult = Timestamp;
    type FieldEntry = Timestamp;
    type ObjectResult = Timestamp;
    type FinalResult = Timestamp;

    fn accept_scalar(
        &self,
        _value: &JsonValue,
        _scalar_type: &ScalarType,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Timestamp, ExecutionError> {
        Ok(None)
    }

    fn accept_null(&self, _info: &FieldExecutionInfo<'_>) -> Result<Timestamp, ExecutionError> {
        Ok(None)
    }

    fn accept_list(
        &self,
        list: Vec<Timestamp>,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Timestamp, ExecutionError> {
        Ok(earliest(list))
    }

    fn accept_child_object(
        &self,
        object: Timestamp,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Timestamp, ExecutionError> {
        Ok(object)
    }

    fn accept_field_entry(
        &self,
        value: Timestamp,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Timestamp, ExecutionError> {
        Ok(value)
    }

    fn accept_field_entries(
        &self,
        entries: Vec<Timestamp>,
        info: &ObjectExecutionInfo<'_>,
    ) -> Result<Timestamp, ExecutionError> {
        Ok(earliest(entries.into_iter().chain(std::iter::once(info.received_at))))
    }

    fn finish(&self, root: Timestamp, _info: &ObjectExecutionInfo<'_>) -> Result<Timestamp, ExecutionError> {
        Ok(root)
    }
}
