//! Query watchers and change notification

#[path = "testutils/mod.rs"]
mod testutils;

use gqlcache::selection::Variables;
use gqlcache::storage::RecordValue;
use gqlcache::{
    CacheKey, ExecutionError, GraphQLQueryWatcher, GraphQLResult, Record, RecordSet, Store,
    StoreSubscriber,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use testutils::fixtures::*;
use uuid::Uuid;

type Delivered = Arc<Mutex<Vec<Result<GraphQLResult, ExecutionError>>>>;

fn watch(store: &Arc<Store>, operation: gqlcache::Operation) -> (GraphQLQueryWatcher, Delivered) {
    let delivered: Delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    let watcher = GraphQLQueryWatcher::new(
        Arc::clone(store),
        operation,
        Variables::new(),
        move |result| sink.lock().push(result),
    );
    watcher.fetch();
    (watcher, delivered)
}

fn rename_first_friend(name: &str) -> RecordSet {
    RecordSet::from_records([Record::new("QUERY_ROOT.hero.friends.0").with_field("name", json!(name))])
}

#[test]
fn test_dependent_watcher_is_notified() {
    testutils::init_logging();
    let store = Arc::new(seeded_store(Store::default(), &["Luke"]));
    let (friends_watcher, friends_results) = watch(&store, hero_and_friends_query());
    let (_name_watcher, name_results) = watch(&store, hero_name_query());
    assert!(friends_watcher
        .dependent_keys()
        .unwrap()
        .contains("QUERY_ROOT.hero.friends.0.name"));

    let changed = store.publish(rename_first_friend("Leia"), None).unwrap();

    assert_eq!(changed, HashSet::from(["QUERY_ROOT.hero.friends.0.name".to_string()]));
    let friends_results = friends_results.lock();
    assert_eq!(friends_results.len(), 2);
    let latest = friends_results[1].as_ref().unwrap();
    assert_eq!(
        serde_json::Value::Object(latest.data.clone().unwrap()),
        json!({"hero": {"name": "R2-D2", "friends": [{"name": "Leia"}]}})
    );
    assert_eq!(name_results.lock().len(), 1);
}

#[test]
fn test_unchanged_merge_does_not_notify() {
    let store = Arc::new(seeded_store(Store::default(), &["Luke"]));
    let (_watcher, results) = watch(&store, hero_and_friends_query());

    let changed = store.publish(rename_first_friend("Luke"), None).unwrap();

    assert!(changed.is_empty());
    assert_eq!(results.lock().len(), 1);
}

#[test]
fn test_own_publish_is_ignored() {
    let store = Arc::new(seeded_store(Store::default(), &["Luke"]));
    let (watcher, results) = watch(&store, hero_and_friends_query());

    store
        .publish(rename_first_friend("Leia"), Some(watcher.context_identifier()))
        .unwrap();
    store.publish(rename_first_friend("Han"), Some(Uuid::new_v4())).unwrap();

    assert_eq!(results.lock().len(), 2);
}

#[test]
fn test_clear_refetches_and_reports_failure() {
    let store = Arc::new(seeded_store(Store::default(), &["Luke"]));
    let (_watcher, results) = watch(&store, hero_name_query());

    store.clear_cache().unwrap();

    let results = results.lock();
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[1].as_ref().unwrap_err().kind(),
        &ExecutionError::MissingValue
    );
}

#[test]
fn test_dropped_watcher_unsubscribes() {
    let store = Arc::new(seeded_store(Store::default(), &["Luke"]));
    let (watcher, results) = watch(&store, hero_and_friends_query());
    assert_eq!(store.subscriber_count(), 1);

    drop(watcher);
    store.publish(rename_first_friend("Leia"), None).unwrap();

    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(results.lock().len(), 1);
}

#[test]
fn test_write_inside_transaction_notifies_after_commit() {
    let store = Arc::new(seeded_store(Store::default(), &["Luke"]));
    let (_watcher, results) = watch(&store, hero_and_friends_query());

    store
        .within_read_write_transaction(|transaction| {
            transaction.merge(rename_first_friend("Leia"))?;
            transaction.merge(rename_first_friend("Han"))?;
            assert_eq!(results.lock().len(), 1);
            Ok(())
        })
        .unwrap();

    let results = results.lock();
    assert_eq!(results.len(), 2);
    let friends = &results[1].as_ref().unwrap().data.as_ref().unwrap()["hero"]["friends"];
    assert_eq!(friends[0]["name"], "Han");
}

struct RecordingSubscriber {
    changes: Mutex<Vec<HashSet<CacheKey>>>,
}

impl StoreSubscriber for RecordingSubscriber {
    fn store_did_change(&self, store: &Store, changed_keys: &HashSet<CacheKey>, _: Option<Uuid>) {
        // Locks are released before subscribers run
        assert!(store.records().is_ok());
        self.changes.lock().push(changed_keys.clone());
    }
}

#[test]
fn test_subscriber_can_read_during_notification() {
    let store = seeded_store(Store::default(), &["Luke"]);
    let subscriber = Arc::new(RecordingSubscriber {
        changes: Mutex::new(Vec::new()),
    });
    let token = store.subscribe(subscriber.clone());

    store
        .publish(
            RecordSet::from_records([Record::new("QUERY_ROOT.hero")
                .with_field("name", json!("C-3PO"))
                .with_field("friends", RecordValue::List(Vec::new()))]),
            None,
        )
        .unwrap();

    assert!(store.unsubscribe(token));
    assert!(!store.unsubscribe(token));
    let changes = subscriber.changes.lock();
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0],
        HashSet::from([
            "QUERY_ROOT.hero.name".to_string(),
            "QUERY_ROOT.hero.friends".to_string()
        ])
    );
}
