// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result accumulators
//!
//! The executor walks the selection tree once and reports every completed value to an
//! accumulator. Several accumulators can share one traversal through [`Zip2`], [`Zip3`] and
//! [`Zip4`], which thread a tuple through every call.

use super::context::{FieldExecutionInfo, ObjectExecutionInfo};
use super::error::ExecutionError;
use crate::selection::ScalarType;
use crate::JsonValue;

/// Visitor building a result from completed values.
///
/// Methods take `&self`; accumulators that collect state across the traversal keep it in a
/// `RefCell`.
pub trait ResultAccumulator {
    type PartialResult: 'static;
    type FieldEntry: 'static;
    type ObjectResult: 'static;
    type FinalResult;

    fn accept_scalar(
        &self,
        value: &JsonValue,
        scalar_type: &ScalarType,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::PartialResult, ExecutionError>;

    fn accept_null(&self, info: &FieldExecutionInfo<'_>)
        -> Result<Self::PartialResult, ExecutionError>;

    fn accept_list(
        &self,
        list: Vec<Self::PartialResult>,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::PartialResult, ExecutionError>;

    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::PartialResult, ExecutionError>;

    fn accept_field_entry(
        &self,
        value: Self::PartialResult,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldEntry, ExecutionError>;

    /// Called once per object, with entries in grouping order
    fn accept_field_entries(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo<'_>,
    ) -> Result<Self::ObjectResult, ExecutionError>;

    /// Called once for the root object
    fn finish(
        &self,
        root: Self::ObjectResult,
        info: &ObjectExecutionInfo<'_>,
    ) -> Result<Self::FinalResult, ExecutionError>;
}

macro_rules! zip_accumulator {
    ($(#[$meta:meta])* $name:ident { $($member:ident : $param:ident => $idx:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        pub struct $name<$($param),+> {
            $(pub $member: $param),+
        }

        impl<$($param),+> $name<$($param),+> {
            pub fn new($($member: $param),+) -> Self {
                Self { $($member),+ }
            }
        }

        impl<$($param: ResultAccumulator),+> ResultAccumulator for $name<$($param),+> {
            type PartialResult = ($(<$param as ResultAccumulator>::PartialResult,)+);
            type FieldEntry = ($(<$param as ResultAccumulator>::FieldEntry,)+);
            type ObjectResult = ($(<$param as ResultAccumulator>::ObjectResult,)+);
            type FinalResult = ($(<$param as ResultAccumulator>::FinalResult,)+);

            fn accept_scalar(
                &self,
                value: &JsonValue,
                scalar_type: &ScalarType,
                info: &FieldExecutionInfo<'_>,
            ) -> Result<Self::PartialResult, ExecutionError> {
                Ok(($(self.$member.accept_scalar(value, scalar_type, info)?,)+))
            }

            fn accept_null(
                &self,
                info: &FieldExecutionInfo<'_>,
            ) -> Result<Self::PartialResult, ExecutionError> {
                Ok(($(self.$member.accept_null(info)?,)+))
            }

            fn accept_list(
                &self,
                list: Vec<Self::PartialResult>,
                info: &FieldExecutionInfo<'_>,
            ) -> Result<Self::PartialResult, ExecutionError> {
                let mut lists = ($(Vec::< <$param as ResultAccumulator>::PartialResult >::with_capacity(list.len()),)+);
                for element in list {
                    $(lists.$idx.push(element.$idx);)+
                }
                Ok(($(self.$member.accept_list(lists.$idx, info)?,)+))
            }

            fn accept_child_object(
                &self,
                object: Self::ObjectResult,
                info: &FieldExecutionInfo<'_>,
            ) -> Result<Self::PartialResult, ExecutionError> {
                Ok(($(self.$member.accept_child_object(object.$idx, info)?,)+))
            }

            fn accept_field_entry(
                &self,
                value: Self::PartialResult,
                info: &FieldExecutionInfo<'_>,
            ) -> Result<Self::FieldEntry, ExecutionError> {
                Ok(($(self.$member.accept_field_entry(value.$idx, info)?,)+))
            }

            fn accept_field_entries(
                &self,
                entries: Vec<Self::FieldEntry>,
                info: &ObjectExecutionInfo<'_>,
            ) -> Result<Self::ObjectResult, ExecutionError> {
                let mut columns = ($(Vec::< <$param as ResultAccumulator>::FieldEntry >::with_capacity(entries.len()),)+);
                for entry in entries {
                    $(columns.$idx.push(entry.$idx);)+
                }
                Ok(($(self.$member.accept_field_entries(columns.$idx, info)?,)+))
            }

            fn finish(
                &self,
                root: Self::ObjectResult,
                info: &ObjectExecutionInfo<'_>,
            ) -> Result<Self::FinalResult, ExecutionError> {
                Ok(($(self.$member.finish(root.$idx, info)?,)+))
            }
        }
    };
}

zip_accumulator! {
    /// Two accumulators driven by one traversal
    Zip2 { first: A => 0, second: B => 1 }
}

zip_accumulator! {
    /// Three accumulators driven by one traversal
    Zip3 { first: A => 0, second: B => 1, third: C => 2 }
}

zip_accumulator! {
    /// Four accumulators driven by one traversal
    Zip4 { first: A => 0, second: B => 1, third: C => 2, fourth: D => 3 }
}
