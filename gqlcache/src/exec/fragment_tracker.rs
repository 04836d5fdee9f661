// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fulfilled fragment tracking

use super::accumulator::ResultAccumulator;
use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::error::ExecutionError;
use crate::selection::ScalarType;
use crate::JsonValue;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Fragment names that applied, keyed by the response path of the object ("" for the root)
pub type FulfilledFragments = BTreeMap<String, BTreeSet<String>>;

/// Accumulator recording which named fragments matched each object's runtime type.
///
/// Objects where no fragment applied are left out.
#[derive(Debug, Default)]
pub struct FragmentTracker {
    fragments: RefCell<FulfilledFragments>,
}

impl FragmentTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultAccumulator for FragmentTracker {
    type PartialResult = ();
    type FieldEntry = ();
    type ObjectResult = ();
    type FinalResult = FulfilledFragments;

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

    fn accept_field_entry(&self, _value: (), _info: &FieldExecutionInfo<'_>) -> Result<(), ExecutionError> {
        Ok(())
    }

    fn accept_field_entries(
        &self,
        _entries: Vec<()>,
        info: &ObjectExecutionInfo<'_>,
    ) -> Result<(), ExecutionError> {
        if !info.fulfilled_fragments.is_empty() {
            self.fragments
                .borrow_mut()
                .entry(info.response_path.joined())
                .or_default()
                .extend(info.fulfilled_fragments.iter().cloned());
        }
        Ok(())
    }

    fn finish(&self, _root: (), _info: &ObjectExecutionInfo<'_>) -> Result<FulfilledFragments, ExecutionError> {
        Ok(self.fragments.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKeyResolver;
    use crate::exec::{Executor, JsonSource};
    use crate::selection::{Fragment, OutputType, ScalarType, Selection, Variables};
    use serde_json::json;

    fn hero_selections() -> Vec<Selection> {
        let string = || OutputType::scalar(ScalarType::String);
        vec![Selection::field(
            "hero",
            OutputType::object(vec![
                Selection::field("__typename", string()),
                Selection::field("name", string()),
                Selection::FragmentSpread(Fragment::new(
                    "DroidDetails",
                    vec!["Droid".to_string()],
                    vec![Selection::field("primaryFunction", string())],
                )),
            ]),
        )]
    }

    fn track(data: crate::JsonObject) -> FulfilledFragments {
        let resolver = CacheKeyResolver::default();
        let source = JsonSource::new(&resolver);
        let tracker = FragmentTracker::new();
        let variables = Variables::new();
        let selections = hero_selections();
        let info = ObjectExecutionInfo::root("QUERY_ROOT", &variables);
        Executor::new(&source, &tracker)
            .execute(&&data, &selections, info)
            .unwrap()
    }

    #[test]
    fn test_matching_fragment_is_recorded_at_object_path() {
        let data = json!({"hero": {"__typename": "Droid", "name": "R2-D2", "primaryFunction": "Astromech"}});
        let fragments = track(data.as_object().unwrap().clone());

        assert_eq!(fragments.len(), 1);
        assert!(fragments["hero"].contains("DroidDetails"));
    }

    #[test]
    fn test_unmatched_fragment_is_not_recorded() {
        let data = json!({"hero": {"__typename": "Human", "name": "Luke Skywalker"}});
        let fragments = track(data.as_object().unwrap().clone());

        assert!(fragments.is_empty());
    }
}
