//! Integration tests for the per-verb lifecycle.

mod helpers;

use std::sync::Arc;

use serde_json::{Value, json};

use docgate::prelude::*;
use docgate::{AppError, ErrorKind, HookedCollection, Verb};

use helpers::{MockStore, entries, event_log, failer, halter, opts, recorder, run_verb, store_method};

#[tokio::test]
async fn test_unsupported_verb_bypasses_hooks_and_store() {
    for verb in Verb::ALL {
        let store = MockStore::new("app.items");
        let log = event_log();
        let mut collection = HookedCollection::new(store.clone())
            .with_allowed_methods(Verb::ALL.into_iter().filter(|v| *v != verb));
        for event in HookEvent::ALL {
            collection.on(event, recorder(&log, event.as_str()));
        }

        let err = run_verb(&collection, verb, None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnsupportedMethod, "{verb}");
        assert_eq!(store.total_calls(), 0, "{verb}");
        assert!(entries(&log).is_empty(), "{verb}: {:?}", entries(&log));
    }
}

#[tokio::test]
async fn test_before_hook_failure_skips_store() {
    for verb in Verb::ALL {
        let store = MockStore::new("app.items");
        let log = event_log();
        let mut collection = HookedCollection::new(store.clone());
        collection.on(HookEvent::before(verb), halter(&log, "before"));
        collection.on(HookEvent::before(verb), recorder(&log, "skipped"));
        collection.on(HookEvent::Error, recorder(&log, "error"));

        let err = run_verb(&collection, verb, None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::HookRejection, "{verb}");
        assert_eq!(store.total_calls(), 0, "{verb}");
        assert_eq!(entries(&log), vec!["before", "error"], "{verb}");
    }
}

#[tokio::test]
async fn test_after_hook_failure_reports_error_after_store_call() {
    for verb in Verb::ALL {
        let store = MockStore::new("app.items");
        let log = event_log();
        let mut collection = HookedCollection::new(store.clone());
        collection.on(HookEvent::before(verb), recorder(&log, "before"));
        collection.on(
            HookEvent::after(verb),
            failer(&log, "after", AppError::internal("after failed")),
        );
        collection.on(HookEvent::Error, recorder(&log, "error"));

        let err = run_verb(&collection, verb, None).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Internal, "{verb}");
        assert_eq!(store.call_count(store_method(verb)), 1, "{verb}");
        assert_eq!(entries(&log), vec!["before", "after", "error"], "{verb}");
    }
}

#[tokio::test]
async fn test_success_runs_before_then_after() {
    for verb in Verb::ALL {
        let store = MockStore::new("app.items");
        let log = event_log();
        let mut collection = HookedCollection::new(store.clone());
        collection.on(HookEvent::after(verb), recorder(&log, "after"));
        collection.on(HookEvent::before(verb), recorder(&log, "before"));
        collection.on(HookEvent::Error, recorder(&log, "error"));

        run_verb(&collection, verb, None).await.unwrap();

        assert_eq!(store.total_calls(), 1, "{verb}");
        assert_eq!(entries(&log), vec!["before", "after"], "{verb}");
    }
}

#[tokio::test]
async fn test_insert_one_returns_inserted_document() {
    let store = MockStore::new("app.items");
    let collection = HookedCollection::new(store.clone());

    let doc = collection
        .insert_one(json!({"a": 1}), opts(json!({})))
        .await
        .unwrap();

    assert_eq!(store.call_count("insertOne"), 1);
    assert_eq!(store.calls()[0].args, vec![json!({"a": 1})]);
    assert_eq!(doc["a"], 1);
    assert!(doc.get("_id").is_some());
    assert!(doc.get("acknowledged").is_none());
}

#[tokio::test]
async fn test_delete_one_reports_zero_deleted() {
    let store = MockStore::new("app.items");
    store.push(
        "deleteOne",
        Ok(json!({"acknowledged": true, "deletedCount": 0})),
    );
    let collection = HookedCollection::new(store.clone());

    let result = collection
        .delete_one(json!({"a": 1}), opts(json!({})))
        .await
        .unwrap();

    assert_eq!(result, json!({"deletedCount": 0}));
}

#[tokio::test]
async fn test_update_returns_summary_by_default() {
    let store = MockStore::new("app.items");
    let collection = HookedCollection::new(store.clone());

    let result = collection
        .update_many(json!({}), json!({"$set": {"x": 1}}), None)
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({"matchedCount": 1, "modifiedCount": 1, "upsertedId": null})
    );
}

#[tokio::test]
async fn test_flags_off_return_raw_result() {
    let store = MockStore::new("app.items");
    let collection = HookedCollection::new(store.clone());

    let raw = collection
        .insert_one(json!({"a": 1}), opts(json!({"returnDocsOnly": false})))
        .await
        .unwrap();
    assert_eq!(raw["acknowledged"], true);
    assert!(raw["ops"].is_array());

    let raw = collection
        .update_one(
            json!({"a": 1}),
            json!({"$set": {"b": 1}}),
            opts(json!({"returnResultOnly": false})),
        )
        .await
        .unwrap();
    assert_eq!(raw["upsertedCount"], 0);

    let raw = collection
        .find_one_and_delete(json!({"a": 1}), opts(json!({"returnDocsOnly": false})))
        .await
        .unwrap();
    assert_eq!(raw["lastErrorObject"]["n"], 1);
}

#[tokio::test]
async fn test_control_flags_not_forwarded_to_store() {
    let store = MockStore::new("app.items");
    let collection = HookedCollection::new(store.clone());

    collection
        .delete_many(
            json!({}),
            opts(json!({"returnResultOnly": false, "returnDocsOnly": true, "w": "majority"})),
        )
        .await
        .unwrap();

    assert_eq!(
        Value::Object(store.calls()[0].options.clone()),
        json!({"w": "majority"})
    );
}

#[tokio::test]
async fn test_upsert_option_rejected_without_store_call() {
    for verb in [
        Verb::UpdateOne,
        Verb::UpdateMany,
        Verb::ReplaceOne,
        Verb::FindOneAndUpdate,
        Verb::FindOneAndReplace,
    ] {
        let store = MockStore::new("app.items");
        let log = event_log();
        let mut collection = HookedCollection::new(store.clone());
        collection.on(HookEvent::before(verb), recorder(&log, "before"));
        collection.on(HookEvent::Error, recorder(&log, "error"));

        let err = run_verb(&collection, verb, opts(json!({"upsert": true})))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UpsertOptionConflict, "{verb}");
        assert_eq!(store.total_calls(), 0, "{verb}");
        assert_eq!(entries(&log), vec!["error"], "{verb}");
    }
}

#[tokio::test]
async fn test_insert_one_array_rejected_through_error_hook() {
    let store = MockStore::new("app.items");
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::Error, recorder(&log, "error"));

    let err = collection
        .insert_one(json!([{"a": 1}]), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(store.total_calls(), 0);
    assert_eq!(entries(&log), vec!["error"]);
}

#[tokio::test]
async fn test_meta_carried_from_before_to_after() {
    let store = MockStore::new("app.items");
    let seen = event_log();
    let mut collection = HookedCollection::new(store.clone());

    collection.on(
        HookEvent::BeforeDeleteOne,
        Arc::new(ClosureHandler::new("tracker", 100, |payload| {
            let count = payload.get_meta("count").and_then(|v| v.as_i64()).unwrap_or(0);
            payload.set_meta("count", json!(count + 1));
            Box::pin(async { HookAction::continue_execution() })
        })),
    );
    let log = seen.clone();
    collection.on(
        HookEvent::AfterDeleteOne,
        Arc::new(ClosureHandler::new("tracker", 100, move |payload| {
            log.lock()
                .unwrap()
                .push(payload.get_meta("count").map(|v| v.to_string()).unwrap_or_default());
            Box::pin(async { HookAction::continue_execution() })
        })),
    );

    collection.delete_one(json!({"a": 1}), None).await.unwrap();
    collection.delete_one(json!({"a": 2}), None).await.unwrap();

    // each invocation starts with an empty meta
    assert_eq!(helpers::entries(&seen), vec!["1", "1"]);
}

#[tokio::test]
async fn test_before_hook_rewrites_reach_store() {
    let store = MockStore::new("app.items");
    let mut collection = HookedCollection::new(store.clone());
    collection.on(
        HookEvent::BeforeUpdateOne,
        Arc::new(ClosureHandler::new("tenant", 100, |payload| {
            if let Some(filter) = payload
                .get_data_mut(keys::FILTER)
                .and_then(|f| f.as_object_mut())
            {
                filter.insert("tenant".into(), json!("acme"));
            }
            Box::pin(async { HookAction::continue_execution() })
        })),
    );

    collection
        .update_one(json!({"a": 1}), json!({"$set": {"b": 2}}), None)
        .await
        .unwrap();

    assert_eq!(store.calls()[0].args[0], json!({"a": 1, "tenant": "acme"}));
}

#[tokio::test]
async fn test_find_one_and_delete_uses_delete_one_events() {
    let store = MockStore::new("app.items");
    let counts = event_log();
    let mut collection = HookedCollection::new(store.clone());
    let log = counts.clone();
    collection.on(
        HookEvent::AfterDeleteOne,
        Arc::new(ClosureHandler::new("counter", 100, move |payload| {
            log.lock().unwrap().push(format!(
                "{}:{}",
                payload.verb,
                payload.get_data(keys::DELETED_COUNT).cloned().unwrap_or(Value::Null)
            ));
            Box::pin(async { HookAction::continue_execution() })
        })),
    );

    let doc = collection
        .find_one_and_delete(json!({"a": 1}), None)
        .await
        .unwrap();

    assert_eq!(doc, json!({"a": 1}));
    assert_eq!(entries(&counts), vec!["findOneAndDelete:1"]);
}

#[tokio::test]
async fn test_find_one_and_replace_reports_matched_count() {
    let store = MockStore::new("app.items");
    let counts = event_log();
    let mut collection = HookedCollection::new(store.clone());
    let log = counts.clone();
    collection.on(
        HookEvent::AfterReplaceOne,
        Arc::new(ClosureHandler::new("counter", 100, move |payload| {
            log.lock().unwrap().push(format!(
                "{}/{}",
                payload.get_data(keys::MATCHED_COUNT).cloned().unwrap_or(Value::Null),
                payload.get_data(keys::IS_UPDATED).cloned().unwrap_or(Value::Null)
            ));
            Box::pin(async { HookAction::continue_execution() })
        })),
    );

    collection
        .find_one_and_replace(json!({"a": 1}), json!({"b": 2}), None)
        .await
        .unwrap();

    assert_eq!(entries(&counts), vec!["1/true"]);
}

#[tokio::test]
async fn test_store_error_routed_through_error_hook() {
    let store = MockStore::new("app.items");
    store.push("insertMany", Err(AppError::store("write concern failed")));
    let log = event_log();
    let mut collection = HookedCollection::new(store.clone());
    collection.on(HookEvent::AfterInsertMany, recorder(&log, "after"));
    collection.on(HookEvent::Error, recorder(&log, "error"));

    let err = collection
        .insert_many(json!([{"a": 1}]), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Store);
    assert_eq!(err.message, "write concern failed");
    assert_eq!(entries(&log), vec!["error"]);
}
