// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed result mapping
//!
//! Builds the response-shaped JSON object for an operation, coercing scalars to their declared
//! kind on the way.

use super::accumulator::ResultAccumulator;
use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::error::ExecutionError;
use super::json_type_name;
use crate::selection::ScalarType;
use crate::{JsonObject, JsonValue};

/// Accumulator producing a [`JsonObject`] keyed by response key
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectionSetMapper;

impl SelectionSetMapper {
    pub fn new() -> Self {
        Self
    }
}

/// Check `value` against its declared scalar kind
pub fn coerce_scalar(value: &JsonValue, scalar_type: &ScalarType) -> Result<JsonValue, ExecutionError> {
    let mismatch = || ExecutionError::wrong_type(scalar_type.name(), json_type_name(value));
    match (scalar_type, value) {
        (ScalarType::String, JsonValue::String(_)) => Ok(value.clone()),
        (ScalarType::Boolean, JsonValue::Bool(_)) => Ok(value.clone()),
        (ScalarType::Int, JsonValue::Number(number)) if number.is_i64() || number.is_u64() => {
            Ok(value.clone())
        }
        (ScalarType::Float, JsonValue::Number(_)) => Ok(value.clone()),
        (ScalarType::ID, JsonValue::String(_)) => Ok(value.clone()),
        (ScalarType::ID, JsonValue::Number(number)) => Ok(JsonValue::String(number.to_string())),
        (ScalarType::Custom(_), _) => Ok(value.clone()),
        _ => Err(mismatch()),
    }
}

impl ResultAccumulator for SelectionSetMapper {
    type PartialResult = JsonValue;
    type FieldEntry = (String, JsonValue);
    type ObjectResult = JsonObject;
    type FinalResult = JsonObject;

    fn accept_scalar(
        &self,
        value: &JsonValue,
        scalar_type: &ScalarType,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<JsonValue, ExecutionError> {
        coerce_scalar(value, scalar_type)
    }

    fn accept_null(&self, _info: &FieldExecutionInfo<'_>) -> Result<JsonValue, ExecutionError> {
        Ok(JsonValue::Null)
    }

    fn accept_list(
        &self,
        list: Vec<JsonValue>,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<JsonValue, ExecutionError> {
        Ok(JsonValue::Array(list))
    }

    fn accept_child_object(
        &self,
        object: JsonObject,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<JsonValue, ExecutionError> {
        Ok(JsonValue::Object(object))
    }

    fn accept_field_entry(
        &self,
        value: JsonValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<(String, JsonValue), ExecutionError> {
        Ok((info.response_key.to_string(), value))
    }

    fn accept_field_entries(
        &self,
        entries: Vec<(String, JsonValue)>,
        _info: &ObjectExecutionInfo<'_>,
    ) -> Result<JsonObject, ExecutionError> {
        Ok(entries.into_iter().collect())
    }

    fn finish(
        &self,
        root: JsonObject,
        _info: &ObjectExecutionInfo<'_>,
    ) -> Result<JsonObject, ExecutionError> {
        Ok(root)
    }
}
