// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Selection model
//!
//! An immutable description of what an operation selects: fields, fragment spreads, type
//! cases and `@include`/`@skip` conditions. The engine only reads these values. They derive
//! serde traits so a code generator or a plain JSON document can produce them.
//!
//! ```text
//! Operation (kind -> root cache key)
//!     └── Selection*
//!           ├── Field { name, alias, arguments, type }
//!           │      └── OutputType::Object(Selection*)
//!           ├── BooleanCondition { variable, inverted, Selection* }
//!           ├── FragmentSpread(Fragment { name, possible_types, Selection* })
//!           └── TypeCase { variants: typename -> Selection*, default: Selection* }
//! ```

pub mod arguments;

pub use arguments::{canonical_value, field_cache_key, InputValue};

use crate::exec::ExecutionError;
use crate::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operation variables by name
pub type Variables = serde_json::Map<String, JsonValue>;

/// One entry of a selection set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Field(Field),
    BooleanCondition(BooleanCondition),
    FragmentSpread(Fragment),
    TypeCase(TypeCase),
}

impl Selection {
    pub fn field(name: impl Into<String>, field_type: OutputType) -> Self {
        Selection::Field(Field::new(name, field_type))
    }

    /// `@include(if: $variable)`
    pub fn include_if(variable: impl Into<String>, selections: Vec<Selection>) -> Self {
        Selection::BooleanCondition(BooleanCondition {
            variable_name: variable.into(),
            inverted: false,
            selections,
        })
    }

    /// `@skip(if: $variable)`
    pub fn skip_if(variable: impl Into<String>, selections: Vec<Selection>) -> Self {
        Selection::BooleanCondition(BooleanCondition {
            variable_name: variable.into(),
            inverted: true,
            selections,
        })
    }
}

impl From<Field> for Selection {
    fn from(field: Field) -> Self {
        Selection::Field(field)
    }
}

/// A selected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, InputValue>,
    #[serde(rename = "type")]
    pub field_type: OutputType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: OutputType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: BTreeMap::new(),
            field_type,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Key of this field in a response object: the alias if present, else the name
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Key of this field inside a normalized record
    pub fn cache_key(&self, variables: &Variables) -> Result<String, ExecutionError> {
        field_cache_key(&self.name, &self.arguments, variables)
    }
}

/// Scalar kinds the typed-result mapper knows how to coerce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Int,
    Float,
    Boolean,
    #[serde(rename = "id")]
    ID,
    /// Passed through untouched
    Custom(String),
}

impl ScalarType {
    pub fn name(&self) -> &str {
        match self {
            ScalarType::String => "String",
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::Boolean => "Boolean",
            ScalarType::ID => "ID",
            ScalarType::Custom(name) => name,
        }
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum OutputType {
    Scalar(ScalarType),
    Object(Vec<Selection>),
    NonNull(Box<OutputType>),
    List(Box<OutputType>),
}

impl OutputType {
    pub fn scalar(scalar: ScalarType) -> Self {
        OutputType::Scalar(scalar)
    }

    pub fn object(selections: Vec<Selection>) -> Self {
        OutputType::Object(selections)
    }

    pub fn non_null(inner: OutputType) -> Self {
        OutputType::NonNull(Box::new(inner))
    }

    pub fn list(inner: OutputType) -> Self {
        OutputType::List(Box::new(inner))
    }

    /// Sub-selections of the innermost object type, if the field is object-typed
    pub fn named_selections(&self) -> Option<&[Selection]> {
        match self {
            OutputType::Scalar(_) => None,
            OutputType::Object(selections) => Some(selections),
            OutputType::NonNull(inner) | OutputType::List(inner) => inner.named_selections(),
        }
    }
}

/// Selections guarded by a boolean variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanCondition {
    pub variable_name: String,
    /// `true` for `@skip`, `false` for `@include`
    #[serde(default)]
    pub inverted: bool,
    pub selections: Vec<Selection>,
}

/// A named fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub name: String,
    /// Concrete object types the type condition applies to
    pub possible_types: Vec<String>,
    pub selections: Vec<Selection>,
}

impl Fragment {
    pub fn new(
        name: impl Into<String>,
        possible_types: Vec<String>,
        selections: Vec<Selection>,
    ) -> Self {
        Self {
            name: name.into(),
            possible_types,
            selections,
        }
    }

    /// Whether the fragment applies to an object of `runtime_type`; unknown types match
    pub fn applies_to(&self, runtime_type: Option<&str>) -> bool {
        match runtime_type {
            Some(type_name) => self.possible_types.iter().any(|t| t == type_name),
            None => true,
        }
    }
}

/// Inline fragments switched on the runtime type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCase {
    pub variants: BTreeMap<String, Vec<Selection>>,
    #[serde(default)]
    pub default: Vec<Selection>,
}

impl TypeCase {
    pub fn branch(&self, runtime_type: Option<&str>) -> &[Selection] {
        runtime_type
            .and_then(|type_name| self.variants.get(type_name))
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }
}

/// Kind of a GraphQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Key of the record holding this operation's root fields
    pub fn root_cache_key(&self) -> &'static str {
        match self {
            OperationKind::Query => "QUERY_ROOT",
            OperationKind::Mutation => "MUTATION_ROOT",
            OperationKind::Subscription => "SUBSCRIPTION_ROOT",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        };
        write!(f, "{}", name)
    }
}

/// A named operation and its root selections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub kind: OperationKind,
    pub selections: Vec<Selection>,
}

impl Operation {
    pub fn query(name: impl Into<String>, selections: Vec<Selection>) -> Self {
        Self {
            name: name.into(),
            kind: OperationKind::Query,
            selections,
        }
    }

    pub fn mutation(name: impl Into<String>, selections: Vec<Selection>) -> Self {
        Self {
            name: name.into(),
            kind: OperationKind::Mutation,
            selections,
        }
    }

    pub fn root_cache_key(&self) -> &'static str {
        self.kind.root_cache_key()
    }
}
