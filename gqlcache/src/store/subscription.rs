// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Store change subscriptions

use super::store::Store;
use crate::cache::CacheKey;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Handle identifying one registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(pub(crate) u64);

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription_{}", self.0)
    }
}

/// Receives store change notifications.
///
/// Called on the writing thread after the write lock has been released, so implementations may
/// read from the store.
pub trait StoreSubscriber: Send + Sync {
    /// `changed_keys` holds `"<record key>.<field key>"` addresses. `context_identifier` is the
    /// identifier the writer published with, if any.
    fn store_did_change(
        &self,
        store: &Store,
        changed_keys: &HashSet<CacheKey>,
        context_identifier: Option<Uuid>,
    );

    /// Every record was removed
    fn store_did_clear(&self, _store: &Store) {}
}
