//! Result normalization: narrows the store's native results to the shapes
//! callers and after-hooks see.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use docgate_core::result::AppResult;
use docgate_core::types::Verb;
use docgate_plugin::hooks::definitions::{HookPayload, keys};

/// Summary of an update or replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    /// Documents matched by the filter.
    pub matched_count: u64,
    /// Documents actually changed.
    pub modified_count: u64,
    /// Identifier of an upserted document, if one was inserted.
    pub upserted_id: Option<Value>,
}

impl UpdateSummary {
    /// Reads `matchedCount`, `modifiedCount`, and `upsertedId`.
    pub fn from_raw(raw: &Value) -> Self {
        let upserted_id = match raw.get("upsertedId") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.contains_key("_id") => map.get("_id").cloned(),
            Some(other) => Some(other.clone()),
        };

        Self {
            matched_count: count(raw, "matchedCount"),
            modified_count: count(raw, "modifiedCount"),
            upserted_id,
        }
    }
}

/// Summary of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    /// Documents removed.
    pub deleted_count: u64,
}

impl DeleteSummary {
    /// Reads `deletedCount`, falling back to `lastErrorObject.n`.
    pub fn from_raw(raw: &Value) -> Self {
        let deleted_count = raw
            .get("deletedCount")
            .and_then(|v| v.as_u64())
            .unwrap_or_else(|| last_error_count(raw));
        Self { deleted_count }
    }
}

/// Outcome of a find-one-and-* call or an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct FindOneOutcome {
    /// The returned document, `null` when nothing matched.
    pub value: Value,
    /// `lastErrorObject.n`.
    pub matched_count: u64,
    /// Whether an existing document was matched rather than inserted.
    pub updated_existing: bool,
}

impl FindOneOutcome {
    /// Reads `value` and `lastErrorObject`.
    ///
    /// Without `updatedExisting`, a match is assumed when `n` is positive and
    /// no `upserted` id is reported.
    pub fn from_raw(raw: &Value) -> Self {
        let matched_count = last_error_count(raw);
        let last_error = raw.get("lastErrorObject");
        let updated_existing = last_error
            .and_then(|l| l.get("updatedExisting"))
            .and_then(|v| v.as_bool())
            .unwrap_or_else(|| {
                matched_count > 0 && last_error.and_then(|l| l.get("upserted")).is_none()
            });

        Self {
            value: raw.get("value").cloned().unwrap_or(Value::Null),
            matched_count,
            updated_existing,
        }
    }
}

/// A normalized result plus the extra fields its after-hook receives.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Normalized {
    /// Value delivered to the caller and exposed as `result` to after-hooks.
    pub result: Value,
    /// Additional after-hook fields.
    pub extras: Vec<(&'static str, Value)>,
}

impl Normalized {
    fn plain(result: Value) -> Self {
        Self {
            result,
            extras: Vec::new(),
        }
    }
}

/// Normalizes `raw` for `verb`; `payload` supplies the submitted documents
/// when the store does not echo them back.
pub(crate) fn normalize(verb: Verb, payload: &HookPayload, raw: &Value) -> AppResult<Normalized> {
    let normalized = match verb {
        Verb::InsertOne => Normalized::plain(inserted_document(payload, raw)),
        Verb::InsertMany => Normalized::plain(inserted_documents(payload, raw)),
        Verb::UpdateOne | Verb::UpdateMany | Verb::ReplaceOne => {
            Normalized::plain(serde_json::to_value(UpdateSummary::from_raw(raw))?)
        }
        Verb::DeleteOne | Verb::DeleteMany => {
            Normalized::plain(serde_json::to_value(DeleteSummary::from_raw(raw))?)
        }
        Verb::FindOneAndUpdate | Verb::FindOneAndReplace => {
            let outcome = FindOneOutcome::from_raw(raw);
            Normalized {
                result: outcome.value,
                extras: vec![
                    (keys::MATCHED_COUNT, json!(outcome.matched_count)),
                    (keys::IS_UPDATED, json!(outcome.updated_existing)),
                ],
            }
        }
        Verb::FindOneAndDelete => {
            let outcome = FindOneOutcome::from_raw(raw);
            Normalized {
                result: outcome.value,
                extras: vec![(keys::DELETED_COUNT, json!(outcome.matched_count))],
            }
        }
        Verb::UpsertOne => {
            let outcome = FindOneOutcome::from_raw(raw);
            Normalized {
                result: outcome.value,
                extras: vec![(keys::IS_UPDATED, json!(outcome.updated_existing))],
            }
        }
    };

    Ok(normalized)
}

fn inserted_document(payload: &HookPayload, raw: &Value) -> Value {
    if let Some(doc) = raw.get("ops").and_then(|ops| ops.get(0)) {
        return doc.clone();
    }

    let mut doc = payload.get_data(keys::DOC).cloned().unwrap_or(Value::Null);
    if let (Some(map), Some(id)) = (doc.as_object_mut(), raw.get("insertedId")) {
        map.entry("_id").or_insert_with(|| id.clone());
    }
    doc
}

fn inserted_documents(payload: &HookPayload, raw: &Value) -> Value {
    if let Some(ops) = raw.get("ops").filter(|ops| ops.is_array()) {
        return ops.clone();
    }

    let mut docs = payload
        .get_data(keys::DOCS)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    if let (Some(list), Some(ids)) = (
        docs.as_array_mut(),
        raw.get("insertedIds").and_then(|ids| ids.as_object()),
    ) {
        for (index, id) in ids {
            let slot = index
                .parse::<usize>()
                .ok()
                .and_then(|i| list.get_mut(i))
                .and_then(|d| d.as_object_mut());
            if let Some(doc) = slot {
                doc.entry("_id").or_insert_with(|| id.clone());
            }
        }
    }
    docs
}

fn count(raw: &Value, key: &str) -> u64 {
    raw.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

fn last_error_count(raw: &Value) -> u64 {
    raw.get("lastErrorObject")
        .and_then(|l| l.get("n"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}
