//! Integration tests for the `error` hook.

mod helpers;

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use docgate::prelude::*;
use docgate::{AppError, ErrorKind, HookedCollection, Verb};

use helpers::{MockStore, entries, event_log, failer, recorder};

/// What an error listener saw.
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    verb: Verb,
    ns: Value,
    filter: Value,
    result: Option<Value>,
    kind: Option<ErrorKind>,
}

fn observer(seen: &Arc<Mutex<Vec<Observed>>>) -> Arc<dyn HookHandler> {
    let seen = seen.clone();
    Arc::new(ClosureHandler::new("observer", 100, move |payload| {
        seen.lock().unwrap().push(Observed {
            verb: payload.verb,
            ns: payload.get_data(keys::NS).cloned().unwrap_or(Value::Null),
            filter: payload.get_data(keys::FILTER).cloned().unwrap_or(Value::Null),
            result: payload.result().cloned(),
            kind: payload.error().map(|e| e.kind),
        });
        Box::pin(async { HookAction::continue_execution() })
    }))
}

#[tokio::test]
async fn test_error_context_carries_operation_fields() {
    let store = MockStore::new("shop.orders");
    store.push("updateOne", Err(AppError::store("not master")));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::Error, observer(&seen));

    let err = collection
        .update_one(json!({"sku": "A1"}), json!({"$inc": {"qty": -1}}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Store);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[Observed {
            verb: Verb::UpdateOne,
            ns: json!("shop.orders"),
            filter: json!({"sku": "A1"}),
            result: None,
            kind: Some(ErrorKind::Store),
        }]
    );
}

#[tokio::test]
async fn test_after_hook_failure_context_includes_result() {
    let store = MockStore::new("shop.orders");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(
        HookEvent::AfterDeleteMany,
        failer(&log, "after", AppError::hook_rejection("audit sink down")),
    );
    collection.on(HookEvent::Error, observer(&seen));

    let err = collection
        .delete_many(json!({"status": "void"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::HookRejection);
    let observed = seen.lock().unwrap().clone();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].result, Some(json!({"deletedCount": 2})));
    // the committed delete is not rolled back
    assert_eq!(store.call_count("deleteMany"), 1);
}

#[tokio::test]
async fn test_listener_failure_translates_error() {
    let store = MockStore::new("shop.orders");
    store.push("replaceOne", Err(AppError::duplicate_key("E11000 dup key: sku")));
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(
        HookEvent::Error,
        failer(&log, "translate", AppError::invalid_argument("sku already exists")),
    );
    collection.on(HookEvent::Error, recorder(&log, "skipped"));

    let err = collection
        .replace_one(json!({"_id": 1}), json!({"sku": "A1"}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(err.message, "sku already exists");
    assert_eq!(entries(&log), vec!["translate"]);
}

#[tokio::test]
async fn test_halting_listener_becomes_rejection() {
    let store = MockStore::new("shop.orders");
    store.push("insertOne", Err(AppError::store("disk full")));
    let mut collection = HookedCollection::new(store.clone());
    collection.on(
        HookEvent::Error,
        Arc::new(ClosureHandler::new("pager", 100, |_payload| {
            Box::pin(async { HookAction::halt("paged on-call") })
        })),
    );

    let err = collection.insert_one(json!({"a": 1}), None).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::HookRejection);
    assert!(err.message.contains("pager"));
}

#[tokio::test]
async fn test_continuing_listeners_surface_original_error() {
    let store = MockStore::new("shop.orders");
    store.push(
        "findOneAndUpdate",
        Err(AppError::store("document failed validation").with_code(121)),
    );
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::Error, recorder(&log, "first"));
    collection.on(HookEvent::Error, recorder(&log, "second"));

    let err = collection
        .find_one_and_update(json!({"_id": 1}), json!({"$set": {"qty": -5}}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Store);
    assert_eq!(err.code, Some(121));
    assert_eq!(entries(&log), vec!["first", "second"]);
}

#[tokio::test]
async fn test_unsupported_method_not_observed() {
    let store = MockStore::new("shop.orders");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut collection =
        HookedCollection::new(store.clone()).with_allowed_methods([Verb::InsertOne]);
    collection.on(HookEvent::Error, observer(&seen));

    let err = collection
        .delete_one(json!({"_id": 1}), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::UnsupportedMethod);
    assert!(seen.lock().unwrap().is_empty());
}
