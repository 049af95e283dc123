//! Integration tests for upsertOne path selection and duplicate-key retry.

mod helpers;

use std::sync::Arc;

use serde_json::{Value, json};

use docgate::prelude::*;
use docgate::{AppError, DUPLICATE_KEY_CODE, ErrorKind, HookedCollection};

use helpers::{EventLog, MockStore, entries, event_log, opts, recorder};

fn is_updated_recorder(log: &EventLog) -> Arc<dyn HookHandler> {
    let log = log.clone();
    Arc::new(ClosureHandler::new("upsert-watch", 100, move |payload| {
        log.lock().unwrap().push(
            payload
                .get_data(keys::IS_UPDATED)
                .cloned()
                .unwrap_or(Value::Null)
                .to_string(),
        );
        Box::pin(async { HookAction::continue_execution() })
    }))
}

#[tokio::test]
async fn test_modifier_document_takes_update_path() {
    let store = MockStore::new("app.users");
    let collection = HookedCollection::new(store.clone());

    collection
        .upsert_one(json!({"email": "a@x"}), json!({"$set": {"name": "A"}}), None)
        .await
        .unwrap();

    assert_eq!(store.call_count("findOneAndUpdate"), 1);
    assert_eq!(store.call_count("findOneAndReplace"), 0);
}

#[tokio::test]
async fn test_plain_document_takes_replace_path() {
    let store = MockStore::new("app.users");
    let collection = HookedCollection::new(store.clone());

    let doc = collection
        .upsert_one(json!({"email": "a@x"}), json!({"email": "a@x", "name": "A"}), None)
        .await
        .unwrap();

    assert_eq!(store.call_count("findOneAndReplace"), 1);
    assert_eq!(store.call_count("findOneAndUpdate"), 0);
    assert_eq!(doc, json!({"email": "a@x", "name": "A"}));
}

#[tokio::test]
async fn test_upsert_flag_forced_on() {
    let store = MockStore::new("app.users");
    let collection = HookedCollection::new(store.clone());

    collection
        .upsert_one(
            json!({"email": "a@x"}),
            json!({"$set": {"name": "A"}}),
            opts(json!({"upsert": false, "returnDocsOnly": true})),
        )
        .await
        .unwrap();

    assert_eq!(
        Value::Object(store.calls()[0].options.clone()),
        json!({"upsert": true})
    );
}

#[tokio::test]
async fn test_duplicate_key_retried_once_then_succeeds() {
    let store = MockStore::new("app.users");
    store.push("findOneAndUpdate", Err(AppError::duplicate_key("E11000 duplicate key")));
    store.push(
        "findOneAndUpdate",
        Ok(json!({"value": {"_id": 7, "name": "A"}, "lastErrorObject": {"n": 1, "updatedExisting": true}})),
    );
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::Error, recorder(&log, "error"));

    let doc = collection
        .upsert_one(json!({"_id": 7}), json!({"$set": {"name": "A"}}), None)
        .await
        .unwrap();

    assert_eq!(doc, json!({"_id": 7, "name": "A"}));
    assert_eq!(store.call_count("findOneAndUpdate"), 2);
    assert!(entries(&log).is_empty());

    let calls = store.calls();
    assert_eq!(calls[0].args, calls[1].args);
}

#[tokio::test]
async fn test_retry_failure_is_surfaced() {
    let store = MockStore::new("app.users");
    store.push("findOneAndReplace", Err(AppError::duplicate_key("E11000 duplicate key")));
    store.push("findOneAndReplace", Err(AppError::store("not primary")));
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::Error, recorder(&log, "error"));

    let err = collection
        .upsert_one(json!({"_id": 7}), json!({"name": "A"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Store);
    assert_eq!(err.message, "not primary");
    assert_eq!(store.call_count("findOneAndReplace"), 2);
    assert_eq!(entries(&log), vec!["error"]);
}

#[tokio::test]
async fn test_second_duplicate_key_is_a_race_error() {
    let store = MockStore::new("app.users");
    for _ in 0..3 {
        store.push("findOneAndUpdate", Err(AppError::duplicate_key("E11000 duplicate key")));
    }
    let collection = HookedCollection::new(store.clone());

    let err = collection
        .upsert_one(json!({"_id": 7}), json!({"$inc": {"n": 1}}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::DuplicateKeyRace);
    assert_eq!(err.code, Some(DUPLICATE_KEY_CODE));
    assert!(std::error::Error::source(&err).is_some());
    // no third attempt
    assert_eq!(store.call_count("findOneAndUpdate"), 2);
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let store = MockStore::new("app.users");
    store.push("findOneAndUpdate", Err(AppError::store("timeout").with_code(50)));
    let collection = HookedCollection::new(store.clone());

    let err = collection
        .upsert_one(json!({"_id": 7}), json!({"$set": {"n": 1}}), None)
        .await
        .unwrap_err();

    assert_eq!(err.code, Some(50));
    assert_eq!(store.call_count("findOneAndUpdate"), 1);
}

#[tokio::test]
async fn test_after_hook_receives_is_updated() {
    let store = MockStore::new("app.users");
    store.push(
        "findOneAndUpdate",
        Ok(json!({"value": {"_id": 1}, "lastErrorObject": {"n": 1, "updatedExisting": true}})),
    );
    store.push(
        "findOneAndUpdate",
        Ok(json!({"value": {"_id": 2}, "lastErrorObject": {"n": 1, "updatedExisting": false, "upserted": 2}})),
    );
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::AfterUpsertOne, is_updated_recorder(&log));

    for id in [1, 2] {
        collection
            .upsert_one(json!({"_id": id}), json!({"$set": {"seen": true}}), None)
            .await
            .unwrap();
    }

    assert_eq!(entries(&log), vec!["true", "false"]);
}

#[tokio::test]
async fn test_raw_result_when_docs_only_disabled() {
    let store = MockStore::new("app.users");
    let collection = HookedCollection::new(store.clone());

    let raw = collection
        .upsert_one(
            json!({"_id": 1}),
            json!({"$set": {"a": 1}}),
            opts(json!({"returnDocsOnly": false})),
        )
        .await
        .unwrap();

    assert_eq!(raw["ok"], 1);
    assert_eq!(raw["lastErrorObject"]["updatedExisting"], true);
}

#[tokio::test]
async fn test_empty_upsert_document_takes_replace_path() {
    let store = MockStore::new("app.users");
    let collection = HookedCollection::new(store.clone());

    collection
        .upsert_one(json!({"_id": 1}), json!({}), None)
        .await
        .unwrap();

    assert_eq!(store.call_count("findOneAndReplace"), 1);
    assert_eq!(store.calls()[0].args[1], json!({}));
    assert_eq!(store.total_calls(), 1);
}
