//! docgate: hook pipeline middleware in front of a document store.
//!
//! Wrap a [`DocumentStore`] in a [`HookedCollection`], register listeners
//! directly or through plugins, then share the collection for traffic:
//!
//! ```rust,ignore
//! let mut users = HookedCollection::new(store);
//! users.add_plugin("audit", &json!({}))?;
//! let users = Arc::new(users);
//! let doc = users.insert_one(json!({"name": "ada"}), None).await?;
//! ```

pub mod logging;

pub use docgate_collection::{
    ControlFlags, DeleteSummary, ErrorInterceptor, FindOneOutcome, HookedCollection,
    OptionExtractor, UpdateSummary, UpsertCoordinator, UpsertOutcome, UpsertPath,
};
pub use docgate_core::config::{AppConfig, CollectionConfig, LoggingConfig, PluginSpec};
pub use docgate_core::error::{AppError, DUPLICATE_KEY_CODE, ErrorKind};
pub use docgate_core::result::AppResult;
pub use docgate_core::traits::DocumentStore;
pub use docgate_core::types::{LegacyMethod, Options, Verb};
pub use docgate_plugin::prelude;
pub use docgate_plugin::{
    HookAction, HookEvent, HookHandler, HookPayload, HookRegistry, HookResult, Plugin,
    PluginHost, PluginInfo, PluginLoader, PluginRef, PluginRegistry,
};
