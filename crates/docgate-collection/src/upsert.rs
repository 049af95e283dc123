//! Upsert coordination: update-if-matched-else-insert with one retry on a
//! duplicate-key race.
//!
//! A concurrent insert can land between the store's match check and its
//! write, making an upsert fail with a duplicate key even though a matching
//! document now exists. Repeating the same call once then finds that
//! document and updates it.

use serde_json::Value;
use tracing::{debug, warn};

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::DocumentStore;
use docgate_core::types::Options;
use docgate_core::types::document::{UPSERT, is_modifier_document};

/// Store method an upsert is delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertPath {
    /// `findOneAndUpdate` with the document as a modifier.
    Update,
    /// `findOneAndReplace` with the document as the replacement.
    Replace,
}

impl UpsertPath {
    /// Modifier documents (every key an update operator) take the update
    /// path; anything else replaces.
    pub fn for_document(doc: &Value) -> Self {
        match doc.as_object() {
            Some(map) if is_modifier_document(map) => Self::Update,
            _ => Self::Replace,
        }
    }
}

/// Successful upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// The store's native find-one-and-* result.
    pub raw: Value,
    /// The path that was taken.
    pub path: UpsertPath,
    /// Store calls made (1 or 2).
    pub attempts: u32,
}

/// Runs an upsert against a store.
#[derive(Debug)]
pub struct UpsertCoordinator<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UpsertCoordinator<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Returns `options` with the store's upsert flag forced on.
    pub fn upsert_options(options: &Options) -> Options {
        let mut options = options.clone();
        options.insert(UPSERT.to_string(), Value::Bool(true));
        options
    }

    /// Upserts `doc` into the document matched by `filter`.
    ///
    /// A duplicate-key failure on the first call triggers exactly one more
    /// identical call whose outcome is final. If that call also reports a
    /// duplicate key the failure is surfaced as
    /// a duplicate-key race error; any other failure is returned as-is.
    pub async fn run(
        &self,
        filter: &Value,
        doc: &Value,
        options: &Options,
    ) -> AppResult<UpsertOutcome> {
        let path = UpsertPath::for_document(doc);
        let options = Self::upsert_options(options);

        debug!(ns = %self.store.namespace(), path = ?path, "Upserting");

        match self.attempt(path, filter, doc, &options).await {
            Ok(raw) => Ok(UpsertOutcome {
                raw,
                path,
                attempts: 1,
            }),
            Err(e) if e.is_duplicate_key() => {
                warn!(
                    ns = %self.store.namespace(),
                    path = ?path,
                    error = %e,
                    "Duplicate key during upsert, retrying once"
                );
                match self.attempt(path, filter, doc, &options).await {
                    Ok(raw) => Ok(UpsertOutcome {
                        raw,
                        path,
                        attempts: 2,
                    }),
                    Err(e) if e.is_duplicate_key() => Err(AppError::duplicate_key_race(
                        "Upsert hit a duplicate key twice",
                        e,
                    )),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn attempt(
        &self,
        path: UpsertPath,
        filter: &Value,
        doc: &Value,
        options: &Options,
    ) -> AppResult<Value> {
        match path {
            UpsertPath::Update => self.store.find_one_and_update(filter, doc, options).await,
            UpsertPath::Replace => self.store.find_one_and_replace(filter, doc, options).await,
        }
    }
}
