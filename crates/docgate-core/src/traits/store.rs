//! Document store trait consumed by hooked collections.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;
use crate::types::Options;

/// The narrow per-verb contract of a document-store collection client.
///
/// Each method receives the filter and/or payload together with the
/// residual options (control flags already removed) and returns the store's
/// native result as JSON. Native shapes the pipeline consumes:
///
/// - inserts: `{"ops": [<persisted documents>], "insertedId": ..}`
/// - update/replace: `{"matchedCount", "modifiedCount", "upsertedId"}`
/// - delete: `{"deletedCount"}` or `{"lastErrorObject": {"n"}}`
/// - find-one-and-*: `{"value", "lastErrorObject": {"n", "updatedExisting"}}`
///
/// Duplicate-key failures must carry
/// [`DUPLICATE_KEY_CODE`](crate::error::DUPLICATE_KEY_CODE).
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Namespace (`database.collection`) of the underlying collection.
    fn namespace(&self) -> &str;

    /// Insert a single document.
    async fn insert_one(&self, doc: &Value, options: &Options) -> AppResult<Value>;

    /// Insert an array of documents.
    async fn insert_many(&self, docs: &Value, options: &Options) -> AppResult<Value>;

    /// Apply a modifier to the first matching document.
    async fn update_one(&self, filter: &Value, update: &Value, options: &Options)
    -> AppResult<Value>;

    /// Apply a modifier to every matching document.
    async fn update_many(
        &self,
        filter: &Value,
        update: &Value,
        options: &Options,
    ) -> AppResult<Value>;

    /// Delete the first matching document.
    async fn delete_one(&self, filter: &Value, options: &Options) -> AppResult<Value>;

    /// Delete every matching document.
    async fn delete_many(&self, filter: &Value, options: &Options) -> AppResult<Value>;

    /// Replace the first matching document.
    async fn replace_one(
        &self,
        filter: &Value,
        replacement: &Value,
        options: &Options,
    ) -> AppResult<Value>;

    /// Apply a modifier to one document and return it.
    async fn find_one_and_update(
        &self,
        filter: &Value,
        update: &Value,
        options: &Options,
    ) -> AppResult<Value>;

    /// Delete one document and return it.
    async fn find_one_and_delete(&self, filter: &Value, options: &Options) -> AppResult<Value>;

    /// Replace one document and return it.
    async fn find_one_and_replace(
        &self,
        filter: &Value,
        replacement: &Value,
        options: &Options,
    ) -> AppResult<Value>;
}
