// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache addressing and record loading

pub mod key;
pub mod loader;

pub use key::{CacheKey, CacheKeyFn, CacheKeyResolver, CacheReference};
pub use loader::DataLoader;
