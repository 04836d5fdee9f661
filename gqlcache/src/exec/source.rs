// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Data sources the executor can read from
//!
//! [`JsonSource`] reads a server response body. [`CacheSource`] reads normalized records,
//! following references through a [`DataLoader`] so reads of sibling objects are batched.

use super::context::FieldExecutionInfo;
use super::deferred::{lazily_evaluate_all, PossiblyDeferred};
use super::error::ExecutionError;
use crate::cache::{CacheKey, CacheKeyResolver, DataLoader};
use crate::storage::{RecordRow, RecordValue};
use crate::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use std::rc::Rc;

/// A resolved field value before completion
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<O> {
    Null,
    Scalar(JsonValue),
    List(Vec<RawValue<O>>),
    Object(O),
}

impl<O> RawValue<O> {
    /// Short description used in type mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Scalar(value) => super::json_type_name(value),
            RawValue::List(_) => "list",
            RawValue::Object(_) => "object",
        }
    }
}

/// Where the executor gets field values from
pub trait ExecutionSource<'a> {
    type Object: Clone + 'a;

    fn resolve_field(
        &self,
        object: &Self::Object,
        info: &FieldExecutionInfo<'a>,
    ) -> PossiblyDeferred<'a, RawValue<Self::Object>>;

    /// Value of `__typename`, when the object carries one
    fn runtime_type(&self, object: &Self::Object) -> Option<String>;

    /// Identity key of the object, restarting the cache path when present
    fn compute_cache_key(&self, object: &Self::Object) -> Option<CacheKey>;

    fn received_at(&self, _object: &Self::Object) -> Option<DateTime<Utc>> {
        None
    }
}

/// Reads a JSON response body by response key
#[derive(Debug, Clone, Copy)]
pub struct JsonSource<'r> {
    resolver: &'r CacheKeyResolver,
}

impl<'r> JsonSource<'r> {
    pub fn new(resolver: &'r CacheKeyResolver) -> Self {
        Self { resolver }
    }
}

fn json_raw_value(value: &JsonValue, leaf: bool) -> RawValue<&JsonObject> {
    match value {
        JsonValue::Null => RawValue::Null,
        JsonValue::Array(items) => {
            RawValue::List(items.iter().map(|item| json_raw_value(item, leaf)).collect())
        }
        JsonValue::Object(object) if !leaf => RawValue::Object(object),
        scalar => RawValue::Scalar(scalar.clone()),
    }
}

impl<'a, 'r> ExecutionSource<'a> for JsonSource<'r> {
    type Object = &'a JsonObject;

    fn resolve_field(
        &self,
        object: &Self::Object,
        info: &FieldExecutionInfo<'a>,
    ) -> PossiblyDeferred<'a, RawValue<Self::Object>> {
        let object: &'a JsonObject = *object;
        let leaf = info.field().field_type.named_selections().is_none();
        match object.get(info.response_key) {
            Some(value) => PossiblyDeferred::immediate(json_raw_value(value, leaf)),
            None => PossiblyDeferred::error(ExecutionError::MissingValue),
        }
    }

    fn runtime_type(&self, object: &Self::Object) -> Option<String> {
        object
            .get("__typename")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    }

    fn compute_cache_key(&self, object: &Self::Object) -> Option<CacheKey> {
        self.resolver.cache_key(object)
    }
}

/// Loader over the rows of a normalized cache
pub type RecordLoader = DataLoader<CacheKey, Option<Rc<RecordRow>>>;

/// Reads normalized records by field cache key
#[derive(Clone)]
pub struct CacheSource {
    loader: RecordLoader,
}

impl CacheSource {
    pub fn new(loader: RecordLoader) -> Self {
        Self { loader }
    }

    fn resolve_value<'a>(&self, value: &RecordValue) -> PossiblyDeferred<'a, RawValue<Rc<RecordRow>>> {
        match value {
            RecordValue::Scalar(JsonValue::Null) => PossiblyDeferred::immediate(RawValue::Null),
            RecordValue::Scalar(scalar) => {
                PossiblyDeferred::immediate(RawValue::Scalar(scalar.clone()))
            }
            RecordValue::Reference(reference) => self
                .loader
                .get(reference.key.clone())
                .map(|row| row.map(RawValue::Object).ok_or(ExecutionError::MissingValue)),
            RecordValue::List(items) => {
                let elements = items.iter().map(|item| self.resolve_value(item)).collect();
                lazily_evaluate_all(elements).map(|elements| Ok(RawValue::List(elements)))
            }
        }
    }
}

impl<'a> ExecutionSource<'a> for CacheSource {
    type Object = Rc<RecordRow>;

    fn resolve_field(
        &self,
        object: &Self::Object,
        info: &FieldExecutionInfo<'a>,
    ) -> PossiblyDeferred<'a, RawValue<Self::Object>> {
        match object.record.get(&info.cache_key) {
            Some(value) => self.resolve_value(value),
            None => PossiblyDeferred::error(ExecutionError::MissingValue),
        }
    }

    fn runtime_type(&self, object: &Self::Object) -> Option<String> {
        match object.record.get("__typename") {
            Some(RecordValue::Scalar(JsonValue::String(type_name))) => Some(type_name.clone()),
            _ => None,
        }
    }

    fn compute_cache_key(&self, object: &Self::Object) -> Option<CacheKey> {
        Some(object.record.key.clone())
    }

    fn received_at(&self, object: &Self::Object) -> Option<DateTime<Utc>> {
        Some(object.last_received_at)
    }
}
