//! Hook event definitions and the payload passed to handlers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::types::{Options, Verb};

/// Well-known keys of [`HookPayload::data`].
pub mod keys {
    /// Query filter.
    pub const FILTER: &str = "filter";
    /// Single document (insertOne, upsertOne).
    pub const DOC: &str = "doc";
    /// Document array (insertMany).
    pub const DOCS: &str = "docs";
    /// Update modifier (update verbs, findOneAndUpdate).
    pub const UPDATE: &str = "update";
    /// Replacement document (replaceOne, findOneAndReplace).
    pub const REPLACEMENT: &str = "replacement";
    /// Residual options forwarded to the store.
    pub const OPTIONS: &str = "options";
    /// Normalized result, present in after-events.
    pub const RESULT: &str = "result";
    /// Namespace of the collection, present in error events.
    pub const NS: &str = "ns";
    /// Whether an upsert or find-one update matched an existing document.
    pub const IS_UPDATED: &str = "isUpdated";
    /// Match count reported for find-one updates and replacements.
    pub const MATCHED_COUNT: &str = "matchedCount";
    /// Delete count reported for find-one deletes.
    pub const DELETED_COUNT: &str = "deletedCount";
}

/// The fixed set of hook events a collection exposes.
///
/// Find-one verbs share the events of their single-document counterpart:
/// `findOneAndUpdate` fires the update-one events, `findOneAndDelete` the
/// delete-one events, `findOneAndReplace` the replace-one events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    // ── Insert ──
    /// Fired before a single document is inserted. Can modify or halt.
    BeforeInsertOne,
    /// Fired after a single document is inserted.
    AfterInsertOne,
    /// Fired before documents are inserted. Can modify or halt.
    BeforeInsertMany,
    /// Fired after documents are inserted.
    AfterInsertMany,

    // ── Update ──
    /// Fired before one document is updated. Can modify or halt.
    BeforeUpdateOne,
    /// Fired after one document is updated.
    AfterUpdateOne,
    /// Fired before matching documents are updated. Can modify or halt.
    BeforeUpdateMany,
    /// Fired after matching documents are updated.
    AfterUpdateMany,

    // ── Delete ──
    /// Fired before one document is deleted. Can halt.
    BeforeDeleteOne,
    /// Fired after one document is deleted.
    AfterDeleteOne,
    /// Fired before matching documents are deleted. Can halt.
    BeforeDeleteMany,
    /// Fired after matching documents are deleted.
    AfterDeleteMany,

    // ── Replace ──
    /// Fired before one document is replaced. Can modify or halt.
    BeforeReplaceOne,
    /// Fired after one document is replaced.
    AfterReplaceOne,

    // ── Upsert ──
    /// Fired before an upsert. Can modify or halt.
    BeforeUpsertOne,
    /// Fired after an upsert, with `isUpdated` set.
    AfterUpsertOne,

    // ── Failure ──
    /// Fired for every operational failure before it reaches the caller.
    Error,
}

impl HookEvent {
    /// Every event, in declaration order.
    pub const ALL: [HookEvent; 17] = [
        HookEvent::BeforeInsertOne,
        HookEvent::AfterInsertOne,
        HookEvent::BeforeInsertMany,
        HookEvent::AfterInsertMany,
        HookEvent::BeforeUpdateOne,
        HookEvent::AfterUpdateOne,
        HookEvent::BeforeUpdateMany,
        HookEvent::AfterUpdateMany,
        HookEvent::BeforeDeleteOne,
        HookEvent::AfterDeleteOne,
        HookEvent::BeforeDeleteMany,
        HookEvent::AfterDeleteMany,
        HookEvent::BeforeReplaceOne,
        HookEvent::AfterReplaceOne,
        HookEvent::BeforeUpsertOne,
        HookEvent::AfterUpsertOne,
        HookEvent::Error,
    ];

    /// Returns the string name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeInsertOne => "before_insert_one",
            Self::AfterInsertOne => "after_insert_one",
            Self::BeforeInsertMany => "before_insert_many",
            Self::AfterInsertMany => "after_insert_many",
            Self::BeforeUpdateOne => "before_update_one",
            Self::AfterUpdateOne => "after_update_one",
            Self::BeforeUpdateMany => "before_update_many",
            Self::AfterUpdateMany => "after_update_many",
            Self::BeforeDeleteOne => "before_delete_one",
            Self::AfterDeleteOne => "after_delete_one",
            Self::BeforeDeleteMany => "before_delete_many",
            Self::AfterDeleteMany => "after_delete_many",
            Self::BeforeReplaceOne => "before_replace_one",
            Self::AfterReplaceOne => "after_replace_one",
            Self::BeforeUpsertOne => "before_upsert_one",
            Self::AfterUpsertOne => "after_upsert_one",
            Self::Error => "error",
        }
    }

    fn camel_name(&self) -> &'static str {
        match self {
            Self::BeforeInsertOne => "beforeInsertOne",
            Self::AfterInsertOne => "afterInsertOne",
            Self::BeforeInsertMany => "beforeInsertMany",
            Self::AfterInsertMany => "afterInsertMany",
            Self::BeforeUpdateOne => "beforeUpdateOne",
            Self::AfterUpdateOne => "afterUpdateOne",
            Self::BeforeUpdateMany => "beforeUpdateMany",
            Self::AfterUpdateMany => "afterUpdateMany",
            Self::BeforeDeleteOne => "beforeDeleteOne",
            Self::AfterDeleteOne => "afterDeleteOne",
            Self::BeforeDeleteMany => "beforeDeleteMany",
            Self::AfterDeleteMany => "afterDeleteMany",
            Self::BeforeReplaceOne => "beforeReplaceOne",
            Self::AfterReplaceOne => "afterReplaceOne",
            Self::BeforeUpsertOne => "beforeUpsertOne",
            Self::AfterUpsertOne => "afterUpsertOne",
            Self::Error => "error",
        }
    }

    /// Returns whether this is a "before" event.
    pub fn is_before_hook(&self) -> bool {
        matches!(
            self,
            Self::BeforeInsertOne
                | Self::BeforeInsertMany
                | Self::BeforeUpdateOne
                | Self::BeforeUpdateMany
                | Self::BeforeDeleteOne
                | Self::BeforeDeleteMany
                | Self::BeforeReplaceOne
                | Self::BeforeUpsertOne
        )
    }

    /// Returns the event fired before `verb` reaches the store.
    pub fn before(verb: Verb) -> Self {
        match verb {
            Verb::InsertOne => Self::BeforeInsertOne,
            Verb::InsertMany => Self::BeforeInsertMany,
            Verb::UpdateOne | Verb::FindOneAndUpdate => Self::BeforeUpdateOne,
            Verb::UpdateMany => Self::BeforeUpdateMany,
            Verb::DeleteOne | Verb::FindOneAndDelete => Self::BeforeDeleteOne,
            Verb::DeleteMany => Self::BeforeDeleteMany,
            Verb::ReplaceOne | Verb::FindOneAndReplace => Self::BeforeReplaceOne,
            Verb::UpsertOne => Self::BeforeUpsertOne,
        }
    }

    /// Returns the event fired after the store completed `verb`.
    pub fn after(verb: Verb) -> Self {
        match verb {
            Verb::InsertOne => Self::AfterInsertOne,
            Verb::InsertMany => Self::AfterInsertMany,
            Verb::UpdateOne | Verb::FindOneAndUpdate => Self::AfterUpdateOne,
            Verb::UpdateMany => Self::AfterUpdateMany,
            Verb::DeleteOne | Verb::FindOneAndDelete => Self::AfterDeleteOne,
            Verb::DeleteMany => Self::AfterDeleteMany,
            Verb::ReplaceOne | Verb::FindOneAndReplace => Self::AfterReplaceOne,
            Verb::UpsertOne => Self::AfterUpsertOne,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = AppError;

    /// Accepts `before_insert_one` as well as `beforeInsertOne`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == s || e.camel_name() == s)
            .ok_or_else(|| AppError::unknown_event(format!("Unknown hook event '{s}'")))
    }
}

/// Payload passed to hook handlers for one operation invocation.
///
/// The same payload travels through the before-stage, the store call, and
/// the after-stage. Handlers may rewrite `data` in a before-event (the store
/// receives the rewritten filter, payload, and options) and use `meta` to
/// hand values from the before-stage to the after-stage. Every invocation
/// starts with an empty `meta`.
#[derive(Debug, Clone)]
pub struct HookPayload {
    /// The event being fired.
    pub event: HookEvent,
    /// The verb being executed.
    pub verb: Verb,
    /// Identifier shared by every event of one invocation.
    pub invocation_id: Uuid,
    /// When the invocation started.
    pub timestamp: DateTime<Utc>,
    /// Operation fields keyed by the names in [`keys`].
    pub data: Map<String, Value>,
    /// Scratch space carried from the before-stage to the after-stage.
    pub meta: Map<String, Value>,
    /// The failure being reported, set only for [`HookEvent::Error`].
    pub error: Option<AppError>,
}

impl HookPayload {
    /// Creates a new payload for the before-stage of `verb`.
    pub fn new(verb: Verb) -> Self {
        Self {
            event: HookEvent::before(verb),
            verb,
            invocation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            data: Map::new(),
            meta: Map::new(),
            error: None,
        }
    }

    /// Inserts a data value.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Sets a data value.
    pub fn set_data(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    /// Gets a data value by key.
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets a mutable data value by key.
    pub fn get_data_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Returns the options forwarded to the store.
    pub fn options(&self) -> Option<&Options> {
        self.data.get(keys::OPTIONS).and_then(|v| v.as_object())
    }

    /// Returns the normalized result (after-events only).
    pub fn result(&self) -> Option<&Value> {
        self.data.get(keys::RESULT)
    }

    /// Stores a value for the after-stage of this invocation.
    pub fn set_meta(&mut self, key: &str, value: Value) {
        self.meta.insert(key.to_string(), value);
    }

    /// Reads a value stored by an earlier handler of this invocation.
    pub fn get_meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// Returns the failure being reported (error events only).
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }
}

/// Action returned by a hook handler telling the dispatcher what to do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookAction {
    /// Continue to the next handler.
    Continue,
    /// Halt the chain; the operation fails with a hook rejection.
    Halt {
        /// Reason for halting.
        reason: String,
    },
}

impl HookAction {
    /// A successful result that continues the chain.
    pub fn continue_execution() -> HookResult {
        Ok(Self::Continue)
    }

    /// A successful result that halts the chain.
    pub fn halt(reason: impl Into<String>) -> HookResult {
        Ok(Self::Halt {
            reason: reason.into(),
        })
    }
}

/// Result returned from a hook handler invocation.
///
/// `Err` short-circuits the chain like `Halt`, but the error is propagated
/// as-is instead of being wrapped in a hook rejection. In an error event
/// this is how a handler translates the failure the caller receives.
pub type HookResult = AppResult<HookAction>;
