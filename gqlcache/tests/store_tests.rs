//! Store transactions
//!
//! Reads, writes, updates and removals through read and read-write transactions, batched
//! record loading, and the rules for nesting transactions.

#[path = "testutils/mod.rs"]
mod testutils;

use gqlcache::selection::Variables;
use gqlcache::{ExecutionError, JsonValue, Store};
use serde_json::json;
use std::sync::Arc;
use testutils::fixtures::*;
use testutils::instrumented_cache::InstrumentedCache;

fn instrumented_store(friends: &[&str]) -> (Store, Arc<InstrumentedCache>) {
    let cache = Arc::new(InstrumentedCache::new());
    let store = seeded_store(Store::new(cache.clone()), friends);
    cache.reset_counts();
    (store, cache)
}

#[test]
fn test_list_elements_load_in_one_batch() {
    testutils::init_logging();
    let (store, cache) = instrumented_store(&["Luke", "Han", "Leia"]);

    store.load(&hero_and_friends_query(), &Variables::new()).unwrap();

    // QUERY_ROOT, then the hero, then all three friends together
    assert_eq!(cache.load_calls(), 3);
    assert_eq!(cache.loaded_keys(), 5);
}

#[test]
fn test_records_are_memoized_within_transaction() {
    let (store, cache) = instrumented_store(&["Luke"]);

    store
        .within_read_transaction(|transaction| {
            transaction.read(&hero_and_friends_query(), &Variables::new())?;
            transaction.read(&hero_name_query(), &Variables::new())
        })
        .unwrap();

    assert_eq!(cache.load_calls(), 3);
}

#[test]
fn test_write_then_read_in_same_transaction() {
    testutils::init_logging();
    let store = Store::default();
    let operation = hero_name_query();

    let name = store
        .within_read_write_transaction(|transaction| {
            let data = json!({"hero": {"name": "R2-D2"}});
            transaction.write(data.as_object().unwrap(), &operation, &Variables::new())?;
            let result = transaction.read(&operation, &Variables::new())?;
            Ok(result.data.unwrap()["hero"]["name"].clone())
        })
        .unwrap();

    assert_eq!(name, json!("R2-D2"));
}

#[test]
fn test_write_reports_changed_keys_once() {
    let store = Store::default();
    let operation = hero_name_query();
    let data = json!({"hero": {"name": "R2-D2"}});

    let first = store
        .within_read_write_transaction(|transaction| {
            transaction.write(data.as_object().unwrap(), &operation, &Variables::new())?;
            Ok(transaction.changed_keys().clone())
        })
        .unwrap();
    let second = store
        .within_read_write_transaction(|transaction| {
            transaction.write(data.as_object().unwrap(), &operation, &Variables::new())?;
            Ok(transaction.changed_keys().clone())
        })
        .unwrap();

    assert!(first.contains("QUERY_ROOT.hero"));
    assert!(first.contains("QUERY_ROOT.hero.name"));
    assert!(second.is_empty());
}

#[test]
fn test_update_edits_cached_data() {
    let store = seeded_store(Store::default(), &["Luke"]);
    let operation = hero_and_friends_query();

    store
        .within_read_write_transaction(|transaction| {
            transaction.update(&operation, &Variables::new(), |data| {
                data["hero"]["friends"][0]["name"] = JsonValue::from("Leia");
                Ok(())
            })
        })
        .unwrap();

    let result = store.load(&operation, &Variables::new()).unwrap();
    assert_eq!(
        JsonValue::Object(result.data.unwrap()),
        json!({"hero": {"name": "R2-D2", "friends": [{"name": "Leia"}]}})
    );
    assert!(store.records().unwrap().dangling_references().is_empty());
}

#[test]
fn test_write_object_by_key() {
    let store = seeded_store(Store::default(), &["Luke"]);
    let selections = vec![gqlcache::Selection::field("name", string())];

    store
        .within_read_write_transaction(|transaction| {
            let data = json!({"name": "Luke Skywalker"});
            transaction.write_object(
                data.as_object().unwrap(),
                "QUERY_ROOT.hero.friends.0",
                &selections,
                &Variables::new(),
            )
        })
        .unwrap();

    let friend = store
        .within_read_transaction(|transaction| {
            transaction.read_object("QUERY_ROOT.hero.friends.0", &selections, &Variables::new())
        })
        .unwrap();
    assert_eq!(friend.get("name"), Some(&json!("Luke Skywalker")));
}

#[test]
fn test_removed_record_makes_read_fail() {
    let store = seeded_store(Store::default(), &["Luke"]);

    store
        .within_read_write_transaction(|transaction| transaction.remove_object("QUERY_ROOT.hero.friends.0"))
        .unwrap();

    let error = store.load(&hero_and_friends_query(), &Variables::new()).unwrap_err();
    assert_eq!(error.kind(), &ExecutionError::MissingValue);
    assert_eq!(error.path().map(|p| p.joined()), Some("hero.friends".to_string()));
    assert!(store.load(&hero_name_query(), &Variables::new()).is_ok());
}

#[test]
fn test_remove_objects_by_pattern() {
    let store = seeded_store(Store::default(), &["Luke", "Han"]);

    store
        .within_read_write_transaction(|transaction| transaction.remove_objects("FRIENDS"))
        .unwrap();

    let records = store.records().unwrap();
    assert_eq!(records.len(), 2);
    assert!(!records.contains("QUERY_ROOT.hero.friends.0"));
    assert!(!records.contains("QUERY_ROOT.hero.friends.1"));
}

#[test]
fn test_failed_body_keeps_earlier_writes() {
    let store = Store::default();
    let operation = hero_name_query();

    let result: Result<(), ExecutionError> = store.within_read_write_transaction(|transaction| {
        let data = json!({"hero": {"name": "R2-D2"}});
        transaction.write(data.as_object().unwrap(), &operation, &Variables::new())?;
        Err(ExecutionError::MissingValue)
    });

    assert!(result.is_err());
    assert!(store.load(&operation, &Variables::new()).is_ok());
}

#[test]
fn test_nested_read_transactions_are_allowed() {
    let store = seeded_store(Store::default(), &["Luke"]);

    let name = store
        .within_read_transaction(|_| {
            store.within_read_transaction(|inner| inner.read(&hero_name_query(), &Variables::new()))
        })
        .unwrap();

    assert!(name.data.is_some());
}

#[test]
fn test_nested_write_transaction_is_rejected() {
    let store = Store::default();

    let from_read = store.within_read_transaction(|_| store.within_read_write_transaction(|_| Ok(())));
    let from_write =
        store.within_read_write_transaction(|_| store.within_read_write_transaction(|_| Ok(())));
    let read_from_write =
        store.within_read_write_transaction(|_| store.within_read_transaction(|_| Ok(())));

    assert!(matches!(from_read, Err(ExecutionError::TransactionState(_))));
    assert!(matches!(from_write, Err(ExecutionError::TransactionState(_))));
    assert!(matches!(read_from_write, Err(ExecutionError::TransactionState(_))));

    // The store is usable again once the outer transactions end
    assert!(store.within_read_write_transaction(|_| Ok(())).is_ok());
}

#[test]
fn test_clear_cache_removes_everything() {
    let store = seeded_store(Store::default(), &["Luke"]);

    store.clear_cache().unwrap();

    assert!(store.records().unwrap().is_empty());
}

#[test]
fn test_open_validates_config() {
    let config = gqlcache::StoreConfig {
        storage_type: gqlcache::StorageType::Sled,
        ..gqlcache::StoreConfig::default()
    };

    let error = Store::open(config).unwrap_err();

    assert!(matches!(error, ExecutionError::StorageError(_)));
}
