//! Closure adapters for quick handler and plugin creation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use docgate_core::result::AppResult;

use crate::hooks::definitions::{HookPayload, HookResult};
use crate::hooks::registry::HookHandler;
use crate::registry::{Plugin, PluginHost, PluginInfo};

type HandlerFn = dyn for<'a> Fn(&'a mut HookPayload) -> BoxFuture<'a, HookResult> + Send + Sync;

/// A closure-based hook handler.
///
/// ```rust,ignore
/// let handler = ClosureHandler::new("guard", 10, |payload| {
///     payload.set_meta("seen", json!(true));
///     Box::pin(async { HookAction::continue_execution() })
/// });
/// ```
pub struct ClosureHandler {
    /// Plugin ID.
    id: String,
    /// Priority.
    priority_val: i32,
    /// Handler function.
    handler: Arc<HandlerFn>,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("id", &self.id)
            .field("priority_val", &self.priority_val)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F>(plugin_id: &str, priority: i32, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut HookPayload) -> BoxFuture<'a, HookResult> + Send + Sync + 'static,
    {
        Self {
            id: plugin_id.to_string(),
            priority_val: priority,
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    async fn handle(&self, payload: &mut HookPayload) -> HookResult {
        (self.handler)(payload).await
    }

    fn plugin_id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority_val
    }
}

type ApplyFn = dyn Fn(&mut dyn PluginHost, &Value) -> AppResult<()> + Send + Sync;

/// A plugin backed by a closure, for plugins that only register handlers.
pub struct PluginFn {
    /// Plugin metadata.
    info: PluginInfo,
    /// Apply function.
    apply: Arc<ApplyFn>,
}

impl std::fmt::Debug for PluginFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginFn")
            .field("info", &self.info)
            .field("apply", &"<closure>")
            .finish()
    }
}

impl PluginFn {
    /// Creates a closure-backed plugin.
    pub fn new<F>(id: &str, apply: F) -> Self
    where
        F: Fn(&mut dyn PluginHost, &Value) -> AppResult<()> + Send + Sync + 'static,
    {
        Self {
            info: PluginInfo::new(id),
            apply: Arc::new(apply),
        }
    }

    /// Wraps the plugin into an `Arc<dyn Plugin>`.
    pub fn shared(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }
}

impl Plugin for PluginFn {
    fn info(&self) -> PluginInfo {
        self.info.clone()
    }

    fn apply(&self, host: &mut dyn PluginHost, options: &Value) -> AppResult<()> {
        (self.apply)(host, options)
    }
}
