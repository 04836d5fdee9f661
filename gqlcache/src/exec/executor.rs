// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Selection set executor
//!
//! Walks a selection tree against any [`ExecutionSource`], completing each resolved value by
//! its declared type and reporting it to a [`ResultAccumulator`].
//!
//! Every field of an object is resolved before any of them is forced, so deferred loads issued
//! by sibling fields (and by the elements of a list) land in the same batch.

use super::accumulator::ResultAccumulator;
use super::collector::collect_fields;
use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::deferred::{lazily_evaluate_all, PossiblyDeferred};
use super::error::ExecutionError;
use super::source::{ExecutionSource, RawValue};
use crate::selection::{Field, OutputType, Selection};
use std::rc::Rc;

/// Executes selections from one source into one accumulator
pub struct Executor<'a, S, A> {
    source: &'a S,
    accumulator: &'a A,
}

impl<'a, S, A> Clone for Executor<'a, S, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S, A> Copy for Executor<'a, S, A> {}

impl<'a, S, A> Executor<'a, S, A>
where
    S: ExecutionSource<'a> + 'a,
    A: ResultAccumulator + 'a,
{
    pub fn new(source: &'a S, accumulator: &'a A) -> Self {
        Self {
            source,
            accumulator,
        }
    }

    /// Execute `selections` against `root` and finish the accumulator
    pub fn execute(
        self,
        root: &S::Object,
        selections: &'a [Selection],
        info: ObjectExecutionInfo<'a>,
    ) -> Result<A::FinalResult, ExecutionError> {
        let root_info = info.clone();
        let result = self.execute_object(root, &[selections], info).get()?;
        self.accumulator.finish(result, &root_info)
    }

    fn execute_object(
        self,
        object: &S::Object,
        selection_sets: &[&'a [Selection]],
        mut info: ObjectExecutionInfo<'a>,
    ) -> PossiblyDeferred<'a, A::ObjectResult> {
        info.runtime_type = self.source.runtime_type(object);
        info.received_at = self.source.received_at(object);

        let grouped = match collect_fields(selection_sets, &mut info) {
            Ok(grouped) => grouped,
            Err(error) => return PossiblyDeferred::error(error),
        };

        let entries: Vec<_> = grouped
            .into_iter()
            .map(|(_, fields)| self.execute_field(object, fields, &info))
            .collect();

        let accumulator = self.accumulator;
        lazily_evaluate_all(entries)
            .map(move |entries| accumulator.accept_field_entries(entries, &info))
    }

    fn execute_field(
        self,
        object: &S::Object,
        fields: Vec<&'a Field>,
        parent: &ObjectExecutionInfo<'a>,
    ) -> PossiblyDeferred<'a, A::FieldEntry> {
        let response_path = parent.response_path.appending(fields[0].response_key());
        let info = match FieldExecutionInfo::new(fields, parent) {
            Ok(info) => Rc::new(info),
            Err(error) => return PossiblyDeferred::error(error.tagged(&response_path)),
        };

        let field_type = &info.field().field_type;
        let completion_info = Rc::clone(&info);
        let accumulator = self.accumulator;

        self.source
            .resolve_field(object, &info)
            .and_then(move |raw| self.complete(raw, field_type, completion_info))
            .map(move |value| accumulator.accept_field_entry(value, &info))
            .map_err(move |error| error.tagged(&response_path))
    }

    fn complete(
        self,
        raw: RawValue<S::Object>,
        field_type: &'a OutputType,
        info: Rc<FieldExecutionInfo<'a>>,
    ) -> PossiblyDeferred<'a, A::PartialResult> {
        let accumulator = self.accumulator;

        match (field_type, raw) {
            (OutputType::NonNull(_), RawValue::Null) => {
                PossiblyDeferred::error(ExecutionError::UnexpectedNull)
            }
            (OutputType::NonNull(inner), raw) => self.complete(raw, inner, info),
            (_, RawValue::Null) => accumulator.accept_null(&info).into(),
            (OutputType::Scalar(scalar_type), RawValue::Scalar(value)) => {
                accumulator.accept_scalar(&value, scalar_type, &info).into()
            }
            (OutputType::Scalar(scalar_type), other) => PossiblyDeferred::error(
                ExecutionError::wrong_type(scalar_type.name(), other.kind_name()),
            ),
            (OutputType::List(element_type), RawValue::List(elements)) => {
                let completed = elements
                    .into_iter()
                    .enumerate()
                    .map(|(index, element)| {
                        self.complete(element, element_type, Rc::new(info.appending_index(index)))
                    })
                    .collect();
                lazily_evaluate_all(completed).map(move |list| accumulator.accept_list(list, &info))
            }
            (OutputType::List(_), other) => {
                PossiblyDeferred::error(ExecutionError::wrong_type("list", other.kind_name()))
            }
            (OutputType::Object(_), RawValue::Object(object)) => {
                let cache_key = self.source.compute_cache_key(&object);
                let child = ObjectExecutionInfo::child(&info, cache_key);
                let selection_sets: Vec<&'a [Selection]> = info
                    .fields
                    .iter()
                    .filter_map(|&field| field.field_type.named_selections())
                    .collect();
                self.execute_object(&object, &selection_sets, child)
                    .map(move |result| accumulator.accept_child_object(result, &info))
            }
            (OutputType::Object(_), other) => {
                PossiblyDeferred::error(ExecutionError::wrong_type("object", other.kind_name()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKeyResolver;
    use crate::exec::{JsonSource, SelectionSetMapper};
    use crate::selection::{ScalarType, Variables};
    use crate::JsonObject;
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn hero_selections() -> Vec<Selection> {
        vec![Selection::field(
            "hero",
            OutputType::object(vec![
                Selection::field("name", OutputType::non_null(OutputType::scalar(ScalarType::String))),
                Selection::field(
                    "friends",
                    OutputType::list(OutputType::object(vec![Selection::field(
                        "name",
                        OutputType::scalar(ScalarType::String),
                    )])),
                ),
            ]),
        )]
    }

    fn map(data: &JsonObject, selections: &[Selection]) -> Result<JsonObject, ExecutionError> {
        let resolver = CacheKeyResolver::default();
        let source = JsonSource::new(&resolver);
        let mapper = SelectionSetMapper::new();
        let variables = Variables::new();
        let info = ObjectExecutionInfo::root("QUERY_ROOT", &variables);
        Executor::new(&source, &mapper).execute(&data, selections, info)
    }

    #[test]
    fn test_maps_nested_objects_and_lists() {
        let data = object(json!({
            "hero": {"name": "R2-D2", "friends": [{"name": "Luke"}, {"name": "Han"}], "extra": 1}
        }));

        let result = map(&data, &hero_selections()).unwrap();

        assert_eq!(
            serde_json::Value::Object(result),
            json!({"hero": {"name": "R2-D2", "friends": [{"name": "Luke"}, {"name": "Han"}]}})
        );
    }

    #[test]
    fn test_unexpected_null_is_tagged_with_path() {
        let data = object(json!({"hero": {"name": null, "friends": []}}));

        let error = map(&data, &hero_selections()).unwrap_err();

        assert_eq!(error.kind(), &ExecutionError::UnexpectedNull);
        assert_eq!(error.path().map(|p| p.joined()), Some("hero.name".to_string()));
    }

    #[test]
    fn test_missing_value_in_list_element() {
        let data = object(json!({"hero": {"name": "R2-D2", "friends": [{"name": "Luke"}, {}]}}));

        let error = map(&data, &hero_selections()).unwrap_err();

        assert_eq!(error.kind(), &ExecutionError::MissingValue);
        assert_eq!(
            error.path().map(|p| p.joined()),
            Some("hero.friends.1.name".to_string())
        );
    }

    #[test]
    fn test_nullable_object_completes_to_null() {
        let data = object(json!({"hero": null}));

        let result = map(&data, &hero_selections()).unwrap();

        assert_eq!(result.get("hero"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_shape_mismatch() {
        let data = object(json!({"hero": "R2-D2"}));

        let error = map(&data, &hero_selections()).unwrap_err();

        assert_eq!(error.kind(), &ExecutionError::wrong_type("object", "string"));
    }
}
