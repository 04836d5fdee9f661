//! Test utilities for gqlcache integration tests
//!
//! - fixtures: hero operations, responses and store helpers
//! - instrumented_cache: a backend that counts loads and detects overlapping access

#![allow(dead_code)]

pub mod fixtures;
pub mod instrumented_cache;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
