//! Verb-specific argument checks run before any hook.

use serde_json::Value;

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::types::document::{UPSERT, is_modifier_document, is_operator_key};
use docgate_core::types::{Options, Verb};
use docgate_plugin::hooks::definitions::{HookPayload, keys};

/// Checks the payload and caller options of `verb`.
pub(crate) fn validate(verb: Verb, payload: &HookPayload, options: &Options) -> AppResult<()> {
    if verb.rejects_upsert_option() && options.contains_key(UPSERT) {
        return Err(AppError::upsert_option_conflict(format!(
            "The 'upsert' option is not allowed on {verb}, use upsertOne instead"
        )));
    }

    match verb {
        Verb::InsertOne => {
            if payload.get_data(keys::DOC).is_some_and(|d| d.is_array()) {
                return Err(AppError::invalid_argument(
                    "insertOne expects a single document, use insertMany for arrays",
                ));
            }
            document(verb, keys::DOC, payload.get_data(keys::DOC)).map(|_| ())
        }
        Verb::InsertMany => {
            let docs = payload
                .get_data(keys::DOCS)
                .and_then(|d| d.as_array())
                .ok_or_else(|| {
                    AppError::invalid_argument("insertMany expects an array of documents")
                })?;
            if docs.iter().any(|d| !d.is_object()) {
                return Err(AppError::invalid_argument(
                    "insertMany expects every element to be a document",
                ));
            }
            Ok(())
        }
        Verb::UpdateOne | Verb::UpdateMany | Verb::FindOneAndUpdate => {
            document(verb, keys::FILTER, payload.get_data(keys::FILTER))?;
            let update = document(verb, keys::UPDATE, payload.get_data(keys::UPDATE))?;
            if !is_modifier_document(update) {
                return Err(AppError::invalid_argument(format!(
                    "{verb} requires an update document made of update operators"
                )));
            }
            Ok(())
        }
        Verb::ReplaceOne | Verb::FindOneAndReplace => {
            document(verb, keys::FILTER, payload.get_data(keys::FILTER))?;
            let replacement =
                document(verb, keys::REPLACEMENT, payload.get_data(keys::REPLACEMENT))?;
            if replacement.keys().any(|k| is_operator_key(k)) {
                return Err(AppError::invalid_argument(format!(
                    "{verb} replacement must not contain update operators"
                )));
            }
            Ok(())
        }
        Verb::DeleteOne | Verb::DeleteMany | Verb::FindOneAndDelete => {
            document(verb, keys::FILTER, payload.get_data(keys::FILTER)).map(|_| ())
        }
        Verb::UpsertOne => {
            document(verb, keys::FILTER, payload.get_data(keys::FILTER))?;
            document(verb, keys::DOC, payload.get_data(keys::DOC)).map(|_| ())
        }
    }
}

fn document<'a>(
    verb: Verb,
    field: &str,
    value: Option<&'a Value>,
) -> AppResult<&'a serde_json::Map<String, Value>> {
    value.and_then(|v| v.as_object()).ok_or_else(|| {
        AppError::invalid_argument(format!("{verb} expects '{field}' to be a document"))
    })
}
