// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Values that may be computed later
//!
//! Field resolution returns a [`PossiblyDeferred`]. Cache-backed resolution hands back
//! deferred thunks so that sibling fields can register their loads before any of them is
//! forced; the first forced thunk then fetches everything pending in one batch.

use super::error::ExecutionError;

type Thunk<'a, T> = Box<dyn FnOnce() -> Result<T, ExecutionError> + 'a>;

/// Either an already computed result or a thunk computing it
pub enum PossiblyDeferred<'a, T> {
    Immediate(Result<T, ExecutionError>),
    Deferred(Thunk<'a, T>),
}

impl<'a, T: 'a> PossiblyDeferred<'a, T> {
    pub fn immediate(value: T) -> Self {
        PossiblyDeferred::Immediate(Ok(value))
    }

    pub fn error(error: ExecutionError) -> Self {
        PossiblyDeferred::Immediate(Err(error))
    }

    pub fn deferred<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Result<T, ExecutionError> + 'a,
    {
        PossiblyDeferred::Deferred(Box::new(thunk))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, PossiblyDeferred::Deferred(_))
    }

    /// Force the value
    pub fn get(self) -> Result<T, ExecutionError> {
        match self {
            PossiblyDeferred::Immediate(result) => result,
            PossiblyDeferred::Deferred(thunk) => thunk(),
        }
    }

    /// Transform the value once available. `transform` may fail.
    pub fn map<U, F>(self, transform: F) -> PossiblyDeferred<'a, U>
    where
        U: 'a,
        F: FnOnce(T) -> Result<U, ExecutionError> + 'a,
    {
        match self {
            PossiblyDeferred::Immediate(result) => {
                PossiblyDeferred::Immediate(result.and_then(transform))
            }
            PossiblyDeferred::Deferred(thunk) => {
                PossiblyDeferred::Deferred(Box::new(move || thunk().and_then(transform)))
            }
        }
    }

    /// Chain another possibly deferred computation
    pub fn and_then<U, F>(self, transform: F) -> PossiblyDeferred<'a, U>
    where
        U: 'a,
        F: FnOnce(T) -> PossiblyDeferred<'a, U> + 'a,
    {
        match self {
            PossiblyDeferred::Immediate(Ok(value)) => transform(value),
            PossiblyDeferred::Immediate(Err(error)) => PossiblyDeferred::Immediate(Err(error)),
            PossiblyDeferred::Deferred(thunk) => {
                PossiblyDeferred::Deferred(Box::new(move || transform(thunk()?).get()))
            }
        }
    }

    pub fn map_err<F>(self, transform: F) -> Self
    where
        F: FnOnce(ExecutionError) -> ExecutionError + 'a,
    {
        match self {
            PossiblyDeferred::Immediate(result) => {
                PossiblyDeferred::Immediate(result.map_err(transform))
            }
            PossiblyDeferred::Deferred(thunk) => {
                PossiblyDeferred::Deferred(Box::new(move || thunk().map_err(transform)))
            }
        }
    }
}

impl<'a, T> From<Result<T, ExecutionError>> for PossiblyDeferred<'a, T> {
    fn from(result: Result<T, ExecutionError>) -> Self {
        PossiblyDeferred::Immediate(result)
    }
}

impl<'a, T> std::fmt::Debug for PossiblyDeferred<'a, T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PossiblyDeferred::Immediate(result) => f.debug_tuple("Immediate").field(result).finish(),
            PossiblyDeferred::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Combine values into one, forcing them in order only when the combination is forced.
///
/// Stays immediate when every input is immediate.
pub fn lazily_evaluate_all<'a, T: 'a>(
    values: Vec<PossiblyDeferred<'a, T>>,
) -> PossiblyDeferred<'a, Vec<T>> {
    if values.iter().any(PossiblyDeferred::is_deferred) {
        PossiblyDeferred::deferred(move || values.into_iter().map(PossiblyDeferred::get).collect())
    } else {
        PossiblyDeferred::Immediate(values.into_iter().map(PossiblyDeferred::get).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_deferred_runs_only_when_forced() {
        let forced = Cell::new(0);
        let value = PossiblyDeferred::deferred(|| {
            forced.set(forced.get() + 1);
            Ok(20)
        })
        .map(|n| Ok(n + 1))
        .and_then(|n| PossiblyDeferred::immediate(n * 2));

        assert_eq!(forced.get(), 0);
        assert_eq!(value.get(), Ok(42));
        assert_eq!(forced.get(), 1);
    }

    #[test]
    fn test_errors_short_circuit() {
        let value: PossiblyDeferred<'_, i32> = PossiblyDeferred::error(ExecutionError::MissingValue)
            .map(|n: i32| Ok(n + 1))
            .map_err(|_| ExecutionError::UnexpectedNull);

        assert_eq!(value.get(), Err(ExecutionError::UnexpectedNull));
    }

    #[test]
    fn test_lazily_evaluate_all() {
        let all_immediate = lazily_evaluate_all(vec![
            PossiblyDeferred::immediate(1),
            PossiblyDeferred::immediate(2),
        ]);
        assert!(!all_immediate.is_deferred());
        assert_eq!(all_immediate.get(), Ok(vec![1, 2]));

        let forced = Cell::new(false);
        let mixed = lazily_evaluate_all(vec![
            PossiblyDeferred::immediate(1),
            PossiblyDeferred::deferred(|| {
                forced.set(true);
                Ok(2)
            }),
        ]);
        assert!(mixed.is_deferred());
        assert!(!forced.get());
        assert_eq!(mixed.get(), Ok(vec![1, 2]));
        assert!(forced.get());
    }
}
