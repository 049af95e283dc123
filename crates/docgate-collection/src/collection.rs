//! Hooked collection: a document store collection whose verbs run through
//! the hook pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use docgate_core::config::CollectionConfig;
use docgate_core::result::AppResult;
use docgate_core::traits::DocumentStore;
use docgate_core::types::{Options, Verb};
use docgate_plugin::hooks::definitions::{HookEvent, HookPayload, keys};
use docgate_plugin::hooks::registry::{HookHandler, HookRegistry};
use docgate_plugin::loader::{PluginLoader, PluginRef};
use docgate_plugin::registry::{PluginHost, PluginInfo, PluginRegistry};

use crate::wrapper::OperationWrapper;

/// A collection wrapped in before/after/error hooks.
///
/// Listeners and plugins are added through `&mut self` while the collection
/// is set up; operations take `&self`, so a configured collection can be
/// shared behind an `Arc` for live traffic.
///
/// Every verb returns either the normalized result or, when the caller sets
/// `returnDocsOnly`/`returnResultOnly` to `false`, the store's raw result.
#[derive(Debug)]
pub struct HookedCollection {
    store: Arc<dyn DocumentStore>,
    hooks: HookRegistry,
    allowed: Option<HashSet<Verb>>,
    loader: PluginLoader,
}

impl HookedCollection {
    /// Wraps `store` with every verb allowed and the built-in plugins
    /// available by name.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            hooks: HookRegistry::new(),
            allowed: None,
            loader: PluginLoader::default(),
        }
    }

    /// Resolves named plugins through `registry` instead of the built-ins.
    pub fn with_plugin_registry(mut self, registry: Arc<PluginRegistry>) -> Self {
        self.loader = PluginLoader::new(registry);
        self
    }

    /// Restricts the collection to `verbs`.
    pub fn with_allowed_methods(mut self, verbs: impl IntoIterator<Item = Verb>) -> Self {
        self.allowed = Some(verbs.into_iter().collect());
        self
    }

    /// Builds a collection from configuration: applies the allow-list, then
    /// each configured plugin in order.
    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        config: &CollectionConfig,
        registry: Arc<PluginRegistry>,
    ) -> AppResult<Self> {
        let mut collection = Self::new(store).with_plugin_registry(registry);

        if let Some(verbs) = config.allowed_verbs()? {
            collection = collection.with_allowed_methods(verbs);
        }

        let loader = collection.loader.clone();
        for spec in &config.plugins {
            loader.load_spec(&mut collection, spec)?;
        }

        info!(
            ns = %collection.namespace(),
            plugins = config.plugins.len(),
            restricted = collection.allowed.is_some(),
            "Hooked collection configured"
        );

        Ok(collection)
    }

    /// Namespace of the underlying collection.
    pub fn namespace(&self) -> &str {
        self.store.namespace()
    }

    /// The wrapped store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The collection's hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Returns whether `verb` passes the allow-list.
    pub fn is_supported(&self, verb: Verb) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&verb))
    }

    /// Registers a listener.
    pub fn on(&mut self, event: HookEvent, handler: Arc<dyn HookHandler>) {
        self.hooks.register(event, handler);
    }

    /// Registers a listener for an event given by name, such as
    /// `beforeInsertOne` or `after_delete_many`.
    pub fn on_named(&mut self, event: &str, handler: Arc<dyn HookHandler>) -> AppResult<HookEvent> {
        self.hooks.register_named(event, handler)
    }

    /// Resolves `plugin` and applies it with `options`.
    pub fn add_plugin(
        &mut self,
        plugin: impl Into<PluginRef>,
        options: &Value,
    ) -> AppResult<PluginInfo> {
        let loader = self.loader.clone();
        loader.load(self, plugin.into(), options)
    }

    /// Inserts `doc` and returns it as stored.
    pub async fn insert_one(&self, doc: Value, options: Option<Options>) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::InsertOne).with_data(keys::DOC, doc);
        self.wrapper().execute(payload, options).await
    }

    /// Inserts every document in the `docs` array.
    ///
    /// Returns the inserted documents unless `returnDocsOnly` is `false`.
    pub async fn insert_many(&self, docs: Value, options: Option<Options>) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::InsertMany).with_data(keys::DOCS, docs);
        self.wrapper().execute(payload, options).await
    }

    /// Applies the modifier document `update` to the first match.
    ///
    /// The normalized result is an `UpdateSummary`.
    pub async fn update_one(
        &self,
        filter: Value,
        update: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::UpdateOne)
            .with_data(keys::FILTER, filter)
            .with_data(keys::UPDATE, update);
        self.wrapper().execute(payload, options).await
    }

    /// Applies `update` to every match.
    pub async fn update_many(
        &self,
        filter: Value,
        update: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::UpdateMany)
            .with_data(keys::FILTER, filter)
            .with_data(keys::UPDATE, update);
        self.wrapper().execute(payload, options).await
    }

    /// Deletes the first document matching `filter`.
    pub async fn delete_one(&self, filter: Value, options: Option<Options>) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::DeleteOne).with_data(keys::FILTER, filter);
        self.wrapper().execute(payload, options).await
    }

    /// Deletes every document matching `filter`.
    pub async fn delete_many(&self, filter: Value, options: Option<Options>) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::DeleteMany).with_data(keys::FILTER, filter);
        self.wrapper().execute(payload, options).await
    }

    /// Replaces the first match with `replacement`, which must not contain
    /// update operators.
    pub async fn replace_one(
        &self,
        filter: Value,
        replacement: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::ReplaceOne)
            .with_data(keys::FILTER, filter)
            .with_data(keys::REPLACEMENT, replacement);
        self.wrapper().execute(payload, options).await
    }

    /// Updates the first match and returns the document.
    ///
    /// Fires the `UpdateOne` events.
    pub async fn find_one_and_update(
        &self,
        filter: Value,
        update: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::FindOneAndUpdate)
            .with_data(keys::FILTER, filter)
            .with_data(keys::UPDATE, update);
        self.wrapper().execute(payload, options).await
    }

    /// Deletes the first match and returns it. Fires the `DeleteOne` events.
    pub async fn find_one_and_delete(
        &self,
        filter: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::FindOneAndDelete).with_data(keys::FILTER, filter);
        self.wrapper().execute(payload, options).await
    }

    /// Replaces the first match and returns the document. Fires the
    /// `ReplaceOne` events.
    pub async fn find_one_and_replace(
        &self,
        filter: Value,
        replacement: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::FindOneAndReplace)
            .with_data(keys::FILTER, filter)
            .with_data(keys::REPLACEMENT, replacement);
        self.wrapper().execute(payload, options).await
    }

    /// Updates the document matched by `filter`, inserting `doc` if none
    /// matches.
    ///
    /// A modifier document (`{"$set": ..}`) is applied as an update; any
    /// other document replaces the match. A duplicate-key race is retried
    /// once. After-listeners receive `isUpdated`.
    pub async fn upsert_one(
        &self,
        filter: Value,
        doc: Value,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let payload = HookPayload::new(Verb::UpsertOne)
            .with_data(keys::FILTER, filter)
            .with_data(keys::DOC, doc);
        self.wrapper().execute(payload, options).await
    }

    fn wrapper(&self) -> OperationWrapper<'_> {
        OperationWrapper {
            store: self.store.as_ref(),
            hooks: &self.hooks,
            allowed: self.allowed.as_ref(),
            namespace: self.store.namespace(),
        }
    }
}

impl PluginHost for HookedCollection {
    fn on(&mut self, event: HookEvent, handler: Arc<dyn HookHandler>) {
        HookedCollection::on(self, event, handler);
    }

    fn on_named(&mut self, event: &str, handler: Arc<dyn HookHandler>) -> AppResult<HookEvent> {
        HookedCollection::on_named(self, event, handler)
    }

    fn namespace(&self) -> &str {
        HookedCollection::namespace(self)
    }
}
