// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Field arguments and their canonical cache-key rendering

use super::Variables;
use crate::exec::ExecutionError;
use crate::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Argument value as written in an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InputValue {
    /// Literal value
    Scalar(JsonValue),
    /// Reference to an operation variable
    Variable(String),
    List(Vec<InputValue>),
    Object(BTreeMap<String, InputValue>),
}

impl InputValue {
    pub fn variable(name: impl Into<String>) -> Self {
        InputValue::Variable(name.into())
    }

    /// Substitute variables, producing a plain JSON value
    pub fn evaluate(&self, variables: &Variables) -> Result<JsonValue, ExecutionError> {
        match self {
            InputValue::Scalar(value) => Ok(value.clone()),
            InputValue::Variable(name) => variables
                .get(name)
                .cloned()
                .ok_or_else(|| ExecutionError::VariableNotProvided(name.clone())),
            InputValue::List(items) => items
                .iter()
                .map(|item| item.evaluate(variables))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            InputValue::Object(fields) => {
                let mut object = crate::JsonObject::new();
                for (name, value) in fields {
                    object.insert(name.clone(), value.evaluate(variables)?);
                }
                Ok(JsonValue::Object(object))
            }
        }
    }
}

impl From<JsonValue> for InputValue {
    fn from(value: JsonValue) -> Self {
        InputValue::Scalar(value)
    }
}

/// Storage key of a field: its name, followed by the canonical argument list if any.
///
/// `hero` with `{episode: "JEDI"}` becomes `hero(episode:"JEDI")`.
pub fn field_cache_key(
    name: &str,
    arguments: &BTreeMap<String, InputValue>,
    variables: &Variables,
) -> Result<String, ExecutionError> {
    if arguments.is_empty() {
        return Ok(name.to_string());
    }

    let mut evaluated = BTreeMap::new();
    for (argument, value) in arguments {
        evaluated.insert(argument.as_str(), value.evaluate(variables)?);
    }

    let rendered: Vec<String> = evaluated
        .iter()
        .map(|(argument, value)| format!("{}:{}", argument, canonical_value(value)))
        .collect();
    Ok(format!("{}({})", name, rendered.join(",")))
}

/// Order-independent rendering of a JSON value.
///
/// Object keys are sorted, arrays keep their order and null is the literal `null`. Strings and
/// object keys are JSON-quoted, so `"null"` and `null` render differently.
pub fn canonical_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(flag) => flag.to_string(),
        JsonValue::Number(number) => number.to_string(),
        JsonValue::String(_) => value.to_string(),
        JsonValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_value).collect();
            format!("[{}]", rendered.join(","))
        }
        JsonValue::Object(object) => {
            let mut entries: Vec<(&String, &JsonValue)> = object.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let rendered: Vec<String> = entries
                .into_iter()
                .map(|(key, value)| {
                    let quoted = JsonValue::String(key.clone());
                    format!("{}:{}", quoted, canonical_value(value))
                })
                .collect();
            format!("{{{}}}", rendered.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scalar_args(pairs: &[(&str, JsonValue)]) -> BTreeMap<String, InputValue> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), InputValue::Scalar(value.clone())))
            .collect()
    }

    #[test]
    fn test_argument_order_does_not_change_key() {
        let variables = Variables::new();
        let first = scalar_args(&[("b", json!(2)), ("a", json!(1))]);
        let second = scalar_args(&[("a", json!(1)), ("b", json!(2))]);

        let first_key = field_cache_key("hero", &first, &variables).unwrap();
        let second_key = field_cache_key("hero", &second, &variables).unwrap();

        assert_eq!(first_key, second_key);
        assert_eq!(first_key, "hero(a:1,b:2)");
    }

    #[test]
    fn test_nested_object_keys_are_sorted() {
        let mut first = crate::JsonObject::new();
        first.insert("z".into(), json!(null));
        first.insert("a".into(), json!([3, 1]));
        let mut second = crate::JsonObject::new();
        second.insert("a".into(), json!([3, 1]));
        second.insert("z".into(), json!(null));

        assert_eq!(
            canonical_value(&JsonValue::Object(first)),
            canonical_value(&JsonValue::Object(second))
        );
        assert_eq!(canonical_value(&json!({"z": null, "a": [3, 1]})), r#"{"a":[3,1],"z":null}"#);
    }

    #[test]
    fn test_variables_are_substituted() {
        let mut variables = Variables::new();
        variables.insert("episode".into(), json!("JEDI"));
        let mut arguments = BTreeMap::new();
        arguments.insert("episode".to_string(), InputValue::variable("episode"));

        let key = field_cache_key("hero", &arguments, &variables).unwrap();
        assert_eq!(key, r#"hero(episode:"JEDI")"#);
    }

    #[test]
    fn test_string_values_do_not_collide_with_other_literals() {
        let variables = Variables::new();
        let spliced = scalar_args(&[("a", json!("1,b:2"))]);
        let separate = scalar_args(&[("a", json!(1)), ("b", json!(2))]);

        assert_ne!(
            field_cache_key("hero", &spliced, &variables).unwrap(),
            field_cache_key("hero", &separate, &variables).unwrap()
        );
        assert_ne!(canonical_value(&json!("null")), canonical_value(&json!(null)));
        assert_ne!(canonical_value(&json!("true")), canonical_value(&json!(true)));
    }

    #[test]
    fn test_missing_variable_is_reported() {
        let mut arguments = BTreeMap::new();
        arguments.insert("episode".to_string(), InputValue::variable("episode"));

        let result = field_cache_key("hero", &arguments, &Variables::new());
        assert_eq!(
            result,
            Err(ExecutionError::VariableNotProvided("episode".to_string()))
        );
    }
}
