// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Field grouping
//!
//! Flattens fragment spreads, type cases and boolean conditions into fields grouped by
//! response key. Groups keep the order in which their key was first met during a depth-first
//! walk of the selections.

use super::context::ObjectExecutionInfo;
use super::error::ExecutionError;
use crate::selection::{Field, Selection};
use crate::JsonValue;
use std::collections::HashMap;

/// Fields grouped by response key
#[derive(Debug, Default)]
pub struct GroupedFieldSet<'a> {
    groups: Vec<(&'a str, Vec<&'a Field>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> GroupedFieldSet<'a> {
    fn add(&mut self, field: &'a Field) {
        let response_key = field.response_key();
        match self.index.get(response_key) {
            Some(&position) => self.groups[position].1.push(field),
            None => {
                self.index.insert(response_key, self.groups.len());
                self.groups.push((response_key, vec![field]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, response_key: &str) -> Option<&[&'a Field]> {
        self.index
            .get(response_key)
            .map(|&position| self.groups[position].1.as_slice())
    }

    pub fn response_keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(key, _)| *key)
    }
}

impl<'a> IntoIterator for GroupedFieldSet<'a> {
    type Item = (&'a str, Vec<&'a Field>);
    type IntoIter = std::vec::IntoIter<(&'a str, Vec<&'a Field>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group the fields of `selection_sets` for the object described by `info`.
///
/// Fragments whose type condition matched are recorded in `info.fulfilled_fragments`.
/// Errors below the root are tagged with the object's response path.
pub fn collect_fields<'a>(
    selection_sets: &[&'a [Selection]],
    info: &mut ObjectExecutionInfo<'a>,
) -> Result<GroupedFieldSet<'a>, ExecutionError> {
    let mut grouped = GroupedFieldSet::default();
    for &selections in selection_sets {
        collect_into(selections, info, &mut grouped).map_err(|error| {
            if info.response_path.is_empty() {
                error
            } else {
                error.tagged(&info.response_path)
            }
        })?;
    }
    Ok(grouped)
}

fn collect_into<'a>(
    selections: &'a [Selection],
    info: &mut ObjectExecutionInfo<'a>,
    grouped: &mut GroupedFieldSet<'a>,
) -> Result<(), ExecutionError> {
    for selection in selections {
        match selection {
            Selection::Field(field) => grouped.add(field),
            Selection::BooleanCondition(condition) => {
                let value = match info.variables.get(&condition.variable_name) {
                    Some(JsonValue::Bool(value)) => *value,
                    Some(other) => {
                        return Err(ExecutionError::wrong_type(
                            "Boolean",
                            super::json_type_name(other),
                        ))
                    }
                    None => {
                        return Err(ExecutionError::VariableNotProvided(
                            condition.variable_name.clone(),
                        ))
                    }
                };
                if value != condition.inverted {
                    collect_into(&condition.selections, info, grouped)?;
                }
            }
            Selection::FragmentSpread(fragment) => {
                if fragment.applies_to(info.runtime_type.as_deref()) {
                    info.fulfilled_fragments.insert(fragment.name.clone());
                    collect_into(&fragment.selections, info, grouped)?;
                }
            }
            Selection::TypeCase(type_case) => {
                let branch = type_case.branch(info.runtime_type.as_deref());
                collect_into(branch, info, grouped)?;
            }
        }
    }
    Ok(())
}
