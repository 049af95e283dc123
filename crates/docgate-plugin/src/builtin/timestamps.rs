//! Timestamps plugin: stamps creation and modification times onto documents
//! before they reach the store.
//!
//! Options: `createdField` (default `createdAt`) and `updatedField`
//! (default `updatedAt`).
//!
//! Replacements only get the modification time. A replacement may land on an
//! existing document, so its creation time stays with the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use docgate_core::result::AppResult;
use docgate_core::types::Verb;
use docgate_core::types::document::is_modifier_document;

use crate::hooks::definitions::{HookAction, HookEvent, HookPayload, HookResult, keys};
use crate::hooks::registry::HookHandler;
use crate::registry::{Plugin, PluginHost, PluginInfo};

/// Registry name of the timestamps plugin.
pub const PLUGIN_ID: &str = "timestamps";

/// Adds `createdAt`/`updatedAt` fields to written documents.
#[derive(Debug, Default)]
pub struct TimestampsPlugin;

impl Plugin for TimestampsPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: PLUGIN_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Stamps creation and modification times".to_string(),
        }
    }

    fn apply(&self, host: &mut dyn PluginHost, options: &Value) -> AppResult<()> {
        let field = |key: &str, default: &str| {
            options
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        let handler: Arc<dyn HookHandler> = Arc::new(Stamp {
            created_field: field("createdField", "createdAt"),
            updated_field: field("updatedField", "updatedAt"),
        });

        for event in [
            HookEvent::BeforeInsertOne,
            HookEvent::BeforeInsertMany,
            HookEvent::BeforeUpdateOne,
            HookEvent::BeforeUpdateMany,
            HookEvent::BeforeReplaceOne,
            HookEvent::BeforeUpsertOne,
        ] {
            host.on(event, handler.clone());
        }

        Ok(())
    }
}

#[derive(Debug)]
struct Stamp {
    created_field: String,
    updated_field: String,
}

impl Stamp {
    fn stamp_new(&self, doc: &mut Map<String, Value>, now: &Value) {
        doc.entry(self.created_field.clone())
            .or_insert_with(|| now.clone());
        doc.insert(self.updated_field.clone(), now.clone());
    }

    fn stamp_modifier(&self, update: &mut Map<String, Value>, now: &Value, on_insert: bool) {
        set_in(update, "$set", &self.updated_field, now);
        if on_insert {
            set_in(update, "$setOnInsert", &self.created_field, now);
        }
    }
}

fn set_in(update: &mut Map<String, Value>, operator: &str, field: &str, now: &Value) {
    let section = update
        .entry(operator.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(section) = section.as_object_mut() {
        section.insert(field.to_string(), now.clone());
    }
}

#[async_trait]
impl HookHandler for Stamp {
    async fn handle(&self, payload: &mut HookPayload) -> HookResult {
        let now = Value::String(Utc::now().to_rfc3339());

        match payload.verb {
            Verb::InsertOne => {
                if let Some(doc) = payload.get_data_mut(keys::DOC).and_then(|d| d.as_object_mut()) {
                    self.stamp_new(doc, &now);
                }
            }
            Verb::InsertMany => {
                if let Some(docs) = payload.get_data_mut(keys::DOCS).and_then(|d| d.as_array_mut()) {
                    for doc in docs.iter_mut().filter_map(|d| d.as_object_mut()) {
                        self.stamp_new(doc, &now);
                    }
                }
            }
            Verb::UpdateOne | Verb::UpdateMany | Verb::FindOneAndUpdate => {
                if let Some(update) = payload
                    .get_data_mut(keys::UPDATE)
                    .and_then(|u| u.as_object_mut())
                    .filter(|u| is_modifier_document(u))
                {
                    self.stamp_modifier(update, &now, false);
                }
            }
            Verb::ReplaceOne | Verb::FindOneAndReplace => {
                if let Some(doc) = payload
                    .get_data_mut(keys::REPLACEMENT)
                    .and_then(|d| d.as_object_mut())
                {
                    doc.insert(self.updated_field.clone(), now);
                }
            }
            Verb::UpsertOne => {
                if let Some(doc) = payload.get_data_mut(keys::DOC).and_then(|d| d.as_object_mut()) {
                    if is_modifier_document(doc) {
                        self.stamp_modifier(doc, &now, true);
                    } else {
                        // replace path
                        doc.insert(self.updated_field.clone(), now);
                    }
                }
            }
            Verb::DeleteOne | Verb::DeleteMany | Verb::FindOneAndDelete => {}
        }

        HookAction::continue_execution()
    }

    fn plugin_id(&self) -> &str {
        PLUGIN_ID
    }
}
