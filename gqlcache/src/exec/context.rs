// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution context for paths, variables and fragment bookkeeping
//!
//! Every object and field visited by the executor gets its own info value. Child infos are
//! derived by extension; a parent's paths are never mutated, so sibling branches cannot see
//! each other's state.

use crate::cache::CacheKey;
use crate::selection::{Field, Variables};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;

/// Dotted path of response keys or cache keys, e.g. `hero.friends.0.name`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResponsePath {
    segments: Vec<String>,
}

impl ResponsePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// A new path with `segment` appended
    pub fn appending(&self, segment: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Segments joined with `.`
    pub fn joined(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined())
    }
}

impl From<&str> for ResponsePath {
    fn from(segment: &str) -> Self {
        Self::from_segments([segment])
    }
}

/// Info for one object being executed
#[derive(Debug, Clone)]
pub struct ObjectExecutionInfo<'a> {
    pub variables: &'a Variables,
    pub response_path: ResponsePath,
    pub cache_path: ResponsePath,
    /// `__typename` of the source object, when it carries one
    pub runtime_type: Option<String>,
    /// Names of fragments whose type condition matched this object
    pub fulfilled_fragments: HashSet<String>,
    /// Last-modified time of the backing record (cache reads only)
    pub received_at: Option<DateTime<Utc>>,
}

impl<'a> ObjectExecutionInfo<'a> {
    /// Info for a root object stored under `root_key`
    pub fn root(root_key: &str, variables: &'a Variables) -> Self {
        Self {
            variables,
            response_path: ResponsePath::new(),
            cache_path: ResponsePath::from(root_key),
            runtime_type: None,
            fulfilled_fragments: HashSet::new(),
            received_at: None,
        }
    }

    /// Info for an object nested below a root, as delivered by incremental payloads.
    pub fn at_path(root_key: &str, path: &[String], variables: &'a Variables) -> Self {
        let mut info = Self::root(root_key, variables);
        for segment in path {
            info.response_path = info.response_path.appending(segment.as_str());
            info.cache_path = info.cache_path.appending(segment.as_str());
        }
        info
    }

    /// Info for the object a field completed to. An identity key restarts the cache path.
    pub(crate) fn child(field: &FieldExecutionInfo<'a>, cache_key: Option<CacheKey>) -> Self {
        Self {
            variables: field.variables,
            response_path: field.response_path.clone(),
            cache_path: match cache_key {
                Some(key) => ResponsePath::from(key.as_str()),
                None => field.cache_path.clone(),
            },
            runtime_type: None,
            fulfilled_fragments: HashSet::new(),
            received_at: None,
        }
    }

    /// Cache key of the record this object normalizes into
    pub fn cache_key(&self) -> CacheKey {
        self.cache_path.joined()
    }
}

/// Info for one grouped field being executed
#[derive(Debug, Clone)]
pub struct FieldExecutionInfo<'a> {
    /// Every selection sharing this response key, in grouping order
    pub fields: Vec<&'a Field>,
    pub response_key: &'a str,
    /// Storage key of the field inside its record, arguments included
    pub cache_key: String,
    pub response_path: ResponsePath,
    pub cache_path: ResponsePath,
    pub variables: &'a Variables,
}

impl<'a> FieldExecutionInfo<'a> {
    pub(crate) fn new(
        fields: Vec<&'a Field>,
        parent: &ObjectExecutionInfo<'a>,
    ) -> Result<Self, super::ExecutionError> {
        let field = fields[0];
        let response_key = field.response_key();
        let cache_key = field.cache_key(parent.variables)?;

        Ok(Self {
            response_path: parent.response_path.appending(response_key),
            cache_path: parent.cache_path.appending(cache_key.as_str()),
            fields,
            response_key,
            cache_key,
            variables: parent.variables,
        })
    }

    /// The first selection of the group
    pub fn field(&self) -> &'a Field {
        self.fields[0]
    }

    /// Info for element `index` of a list value
    pub(crate) fn appending_index(&self, index: usize) -> Self {
        let segment = index.to_string();
        Self {
            fields: self.fields.clone(),
            response_key: self.response_key,
            cache_key: self.cache_key.clone(),
            response_path: self.response_path.appending(segment.as_str()),
            cache_path: self.cache_path.appending(segment),
            variables: self.variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{OutputType, ScalarType};

    #[test]
    fn test_paths_extend_without_mutating_parent() {
        let variables = Variables::new();
        let root = ObjectExecutionInfo::root("QUERY_ROOT", &variables);
        let field = Field::new("hero", OutputType::scalar(ScalarType::String));

        let info = FieldExecutionInfo::new(vec![&field], &root).unwrap();
        let first = info.appending_index(0);
        let second = info.appending_index(1);

        assert_eq!(root.cache_path.joined(), "QUERY_ROOT");
        assert_eq!(info.cache_path.joined(), "QUERY_ROOT.hero");
        assert_eq!(first.cache_path.joined(), "QUERY_ROOT.hero.0");
        assert_eq!(second.response_path.joined(), "hero.1");
    }

    #[test]
    fn test_identity_key_restarts_cache_path() {
        let variables = Variables::new();
        let root = ObjectExecutionInfo::root("QUERY_ROOT", &variables);
        let field = Field::new("hero", OutputType::scalar(ScalarType::String));
        let info = FieldExecutionInfo::new(vec![&field], &root).unwrap();

        let keyed = ObjectExecutionInfo::child(&info, Some("Droid:2001".to_string()));
        let pathed = ObjectExecutionInfo::child(&info, None);

        assert_eq!(keyed.cache_key(), "Droid:2001");
        assert_eq!(keyed.response_path.joined(), "hero");
        assert_eq!(pathed.cache_key(), "QUERY_ROOT.hero");
    }

    #[test]
    fn test_incremental_root_path() {
        let variables = Variables::new();
        let path = vec!["hero".to_string(), "friends".to_string(), "0".to_string()];
        let info = ObjectExecutionInfo::at_path("QUERY_ROOT", &path, &variables);

        assert_eq!(info.cache_key(), "QUERY_ROOT.hero.friends.0");
        assert_eq!(info.response_path.joined(), "hero.friends.0");
    }
}
