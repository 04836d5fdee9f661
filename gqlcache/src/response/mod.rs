// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Server responses and operation results
//!
//! A [`GraphQLResponse`] is parsed from the `{data, errors, extensions}` body and then executed
//! once against the operation, producing the typed data, the records to publish and the
//! dependent keys in a single traversal.

use crate::cache::{CacheKey, CacheKeyResolver};
use crate::exec::{
    DependencyTracker, ExecutionError, Executor, FragmentTracker, FulfilledFragments, JsonSource,
    ObjectExecutionInfo, ResultNormalizer, SelectionSetMapper, Zip4,
};
use crate::selection::{Operation, OperationKind, Selection, Variables};
use crate::storage::RecordSet;
use crate::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Step of a response path: a field name or a list index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of an error in the operation document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// Error reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<SourceLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonObject>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) if !path.is_empty() => {
                let joined: Vec<String> = path.iter().map(ToString::to_string).collect();
                write!(f, "{} (at {})", self.message, joined.join("."))
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Server,
    Cache,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Oldest record timestamp a cache read touched
    pub first_received_at: Option<DateTime<Utc>>,
}

/// Data for an operation together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLResult {
    pub data: Option<JsonObject>,
    pub errors: Vec<GraphQLError>,
    pub extensions: Option<JsonObject>,
    pub source: ResultSource,
    /// Addresses the data was read from
    pub dependent_keys: Option<HashSet<CacheKey>>,
    /// Named fragments that applied, by response path of the object
    pub fulfilled_fragments: FulfilledFragments,
    pub metadata: ResultMetadata,
}

impl GraphQLResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether `fragment` applied to the object at `response_path` (`""` for the root)
    pub fn fragment_fulfilled(&self, response_path: &str, fragment: &str) -> bool {
        self.fulfilled_fragments
            .get(response_path)
            .map_or(false, |names| names.contains(fragment))
    }

    /// Decode the data into a typed value
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, ExecutionError> {
        let data = self.data.clone().ok_or(ExecutionError::MissingValue)?;
        serde_json::from_value(JsonValue::Object(data)).map_err(|error| {
            ExecutionError::wrong_type(std::any::type_name::<T>(), error.to_string())
        })
    }
}

fn parse_data(
    data: &JsonObject,
    selections: &[Selection],
    info: ObjectExecutionInfo<'_>,
    resolver: &CacheKeyResolver,
) -> Result<(JsonObject, RecordSet, HashSet<CacheKey>, FulfilledFragments), ExecutionError> {
    let source = JsonSource::new(resolver);
    let accumulator = Zip4::new(
        SelectionSetMapper::new(),
        ResultNormalizer::new(),
        DependencyTracker::new(),
        FragmentTracker::new(),
    );
    Executor::new(&source, &accumulator).execute(&data, selections, info)
}

/// Body of a GraphQL response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonObject>,
}

impl GraphQLResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, ExecutionError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn from_value(body: JsonValue) -> Result<Self, ExecutionError> {
        Ok(serde_json::from_value(body)?)
    }

    /// Execute the body against `operation`.
    ///
    /// Returns the result and, when the body carried data, the records to publish.
    pub fn parse_result(
        &self,
        operation: &Operation,
        variables: &Variables,
        resolver: &CacheKeyResolver,
    ) -> Result<(GraphQLResult, Option<RecordSet>), ExecutionError> {
        let mut result = GraphQLResult {
            data: None,
            errors: self.errors.clone(),
            extensions: self.extensions.clone(),
            source: ResultSource::Server,
            dependent_keys: None,
            fulfilled_fragments: FulfilledFragments::new(),
            metadata: ResultMetadata::default(),
        };

        let Some(data) = &self.data else {
            log::debug!(
                "{} {} returned no data ({} errors)",
                operation.kind,
                operation.name,
                self.errors.len()
            );
            return Ok((result, None));
        };

        let info = ObjectExecutionInfo::root(operation.root_cache_key(), variables);
        let (mapped, records, dependent_keys, fulfilled_fragments) =
            parse_data(data, &operation.selections, info, resolver)?;
        log::debug!(
            "{} {} normalized into {} records",
            operation.kind,
            operation.name,
            records.len()
        );

        result.data = Some(mapped);
        result.dependent_keys = Some(dependent_keys);
        result.fulfilled_fragments = fulfilled_fragments;
        Ok((result, Some(records)))
    }
}

/// Payload delivering a deferred fragment below `path`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncrementalPayload {
    #[serde(default)]
    pub data: Option<JsonObject>,
    #[serde(default)]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonObject>,
}

impl IncrementalPayload {
    /// Execute the payload against the deferred fragment's selections.
    ///
    /// Records are keyed below the operation root extended by `path`, so objects on the path
    /// must be keyed by response path.
    pub fn parse_result(
        &self,
        selections: &[Selection],
        kind: OperationKind,
        variables: &Variables,
        resolver: &CacheKeyResolver,
    ) -> Result<(GraphQLResult, Option<RecordSet>), ExecutionError> {
        let mut result = GraphQLResult {
            data: None,
            errors: self.errors.clone(),
            extensions: self.extensions.clone(),
            source: ResultSource::Server,
            dependent_keys: None,
            fulfilled_fragments: FulfilledFragments::new(),
            metadata: ResultMetadata::default(),
        };

        let Some(data) = &self.data else {
            return Ok((result, None));
        };

        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        let info = ObjectExecutionInfo::at_path(kind.root_cache_key(), &path, variables);
        let (mapped, records, dependent_keys, fulfilled_fragments) =
            parse_data(data, selections, info, resolver)?;

        result.data = Some(mapped);
        result.dependent_keys = Some(dependent_keys);
        result.fulfilled_fragments = fulfilled_fragments;
        Ok((result, Some(records)))
    }
}
