// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cache keys, references and object identity

use crate::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Address of a record, e.g. `QUERY_ROOT.hero` or `Droid:2001`
pub type CacheKey = String;

/// Pointer to another record, stored where a nested object would otherwise appear
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheReference {
    pub key: CacheKey,
}

impl CacheReference {
    pub fn new(key: impl Into<CacheKey>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Display for CacheReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> #{}", self.key)
    }
}

/// Function computing an identity key for a response object
pub type CacheKeyFn = dyn Fn(&JsonObject) -> Option<CacheKey> + Send + Sync;

/// Decides which key an object normalizes under.
///
/// Objects without an identity key are stored under their cache path.
#[derive(Clone, Default)]
pub enum CacheKeyResolver {
    /// Every object is keyed by its path from the root
    #[default]
    ResponsePath,
    /// `<__typename>:<value>[:<value>...]` when the typename and every listed field are present
    KeyFields(Vec<String>),
    Custom(Arc<CacheKeyFn>),
}

impl CacheKeyResolver {
    pub fn key_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CacheKeyResolver::KeyFields(fields.into_iter().map(Into::into).collect())
    }

    pub fn custom<F>(resolve: F) -> Self
    where
        F: Fn(&JsonObject) -> Option<CacheKey> + Send + Sync + 'static,
    {
        CacheKeyResolver::Custom(Arc::new(resolve))
    }

    pub fn cache_key(&self, object: &JsonObject) -> Option<CacheKey> {
        match self {
            CacheKeyResolver::ResponsePath => None,
            CacheKeyResolver::KeyFields(fields) => {
                if fields.is_empty() {
                    return None;
                }
                let typename = object.get("__typename")?.as_str()?;
                let mut parts = Vec::with_capacity(fields.len() + 1);
                parts.push(typename.to_string());
                for field in fields {
                    match object.get(field)? {
                        JsonValue::String(value) => parts.push(value.clone()),
                        JsonValue::Number(value) => parts.push(value.to_string()),
                        _ => return None,
                    }
                }
                Some(parts.join(":"))
            }
            CacheKeyResolver::Custom(resolve) => resolve(object),
        }
    }
}

impl fmt::Debug for CacheKeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKeyResolver::ResponsePath => write!(f, "ResponsePath"),
            CacheKeyResolver::KeyFields(fields) => f.debug_tuple("KeyFields").field(fields).finish(),
            CacheKeyResolver::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: JsonValue) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_key_fields_resolution() {
        let resolver = CacheKeyResolver::key_fields(["id"]);

        let droid = object(json!({"__typename": "Droid", "id": "2001", "name": "R2-D2"}));
        assert_eq!(resolver.cache_key(&droid), Some("Droid:2001".to_string()));

        let numeric = object(json!({"__typename": "Ship", "id": 7}));
        assert_eq!(resolver.cache_key(&numeric), Some("Ship:7".to_string()));

        let untyped = object(json!({"id": "2001"}));
        assert_eq!(resolver.cache_key(&untyped), None);

        let missing = object(json!({"__typename": "Droid"}));
        assert_eq!(resolver.cache_key(&missing), None);
    }

    #[test]
    fn test_default_resolver_uses_paths() {
        let droid = object(json!({"__typename": "Droid", "id": "2001"}));
        assert_eq!(CacheKeyResolver::default().cache_key(&droid), None);
    }

    #[test]
    fn test_custom_resolver() {
        let resolver = CacheKeyResolver::custom(|object| {
            object
                .get("uuid")
                .and_then(JsonValue::as_str)
                .map(|uuid| format!("entity:{}", uuid))
        });
        let entity = object(json!({"uuid": "abc"}));
        assert_eq!(resolver.cache_key(&entity), Some("entity:abc".to_string()));
    }
}
