// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution engine
//!
//! ```text
//! source object ──► collect_fields ──► resolve ──► complete ──► accumulator(s)
//!                   (group by key)     (source)    (by type)    (mapper, normalizer, ...)
//! ```
//!
//! - [`Executor`]: generic interpreter over an [`ExecutionSource`] and a [`ResultAccumulator`]
//! - [`JsonSource`] / [`CacheSource`]: server response bodies and normalized records
//! - [`SelectionSetMapper`], [`ResultNormalizer`], [`DependencyTracker`],
//!   [`FirstReceivedAtTracker`], [`FragmentTracker`]: accumulators, combined with [`Zip2`], [`Zip3`] or [`Zip4`]

pub mod accumulator;
pub mod collector;
pub mod context;
pub mod deferred;
pub mod dependency_tracker;
pub mod error;
pub mod executor;
pub mod fragment_tracker;
pub mod mapper;
pub mod normalizer;
pub mod received_at;
pub mod source;

pub use accumulator::{ResultAccumulator, Zip2, Zip3, Zip4};
pub use collector::{collect_fields, GroupedFieldSet};
pub use context::{FieldExecutionInfo, ObjectExecutionInfo, ResponsePath};
pub use deferred::{lazily_evaluate_all, PossiblyDeferred};
pub use dependency_tracker::DependencyTracker;
pub use error::ExecutionError;
pub use executor::Executor;
pub use fragment_tracker::{FragmentTracker, FulfilledFragments};
pub use mapper::{coerce_scalar, SelectionSetMapper};
pub use normalizer::ResultNormalizer;
pub use received_at::FirstReceivedAtTracker;
pub use source::{CacheSource, ExecutionSource, JsonSource, RawValue, RecordLoader};

use crate::JsonValue;

/// JSON type name used in type mismatch errors
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
