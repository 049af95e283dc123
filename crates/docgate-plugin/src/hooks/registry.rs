//! Hook registry: per-collection handler lists keyed by hook event.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use docgate_core::result::AppResult;

use super::definitions::{HookEvent, HookPayload, HookResult};
use super::dispatcher::HookDispatcher;

/// Priority given to handlers that do not choose one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles a hook invocation.
    async fn handle(&self, payload: &mut HookPayload) -> HookResult;

    /// Returns the plugin ID owning this handler.
    fn plugin_id(&self) -> &str;

    /// Returns the priority (lower = runs first).
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }
}

/// Entry in the hook registry.
#[derive(Debug)]
struct HookEntry {
    /// The handler.
    handler: Arc<dyn HookHandler>,
    /// Priority (lower = earlier execution).
    priority: i32,
    /// Plugin that registered this handler.
    plugin_id: String,
}

/// Registry of hook handlers organized by hook event.
///
/// Registration takes `&mut self`: handlers are added while a collection is
/// being set up and the lists are read-only once it serves operations.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook event → handlers in execution order.
    handlers: HashMap<HookEvent, Vec<HookEntry>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a hook event.
    ///
    /// Handlers run by ascending priority; equal priorities run in
    /// registration order.
    pub fn register(&mut self, hook: HookEvent, handler: Arc<dyn HookHandler>) {
        let plugin_id = handler.plugin_id().to_string();
        let priority = handler.priority();

        let entries = self.handlers.entry(hook).or_default();

        entries.push(HookEntry {
            handler,
            priority,
            plugin_id: plugin_id.clone(),
        });

        // Stable sort keeps registration order within a priority
        entries.sort_by_key(|e| e.priority);

        info!(
            hook = %hook,
            plugin_id = %plugin_id,
            priority = priority,
            "Hook handler registered"
        );
    }

    /// Registers a handler for an event given by name.
    ///
    /// Fails with an unknown-event error for names outside the fixed set.
    pub fn register_named(
        &mut self,
        hook: &str,
        handler: Arc<dyn HookHandler>,
    ) -> AppResult<HookEvent> {
        let event: HookEvent = hook.parse()?;
        self.register(event, handler);
        Ok(event)
    }

    /// Unregisters all handlers for a specific plugin.
    pub fn unregister_plugin(&mut self, plugin_id: &str) {
        for entries in self.handlers.values_mut() {
            entries.retain(|e| e.plugin_id != plugin_id);
        }

        // Remove empty hook entries
        self.handlers.retain(|_, entries| !entries.is_empty());

        info!(plugin_id = %plugin_id, "All hooks unregistered for plugin");
    }

    /// Returns all handlers for a hook event, in execution order.
    pub fn get_handlers(&self, hook: HookEvent) -> Vec<Arc<dyn HookHandler>> {
        self.handlers
            .get(&hook)
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns whether any handlers are registered for a hook event.
    pub fn has_handlers(&self, hook: HookEvent) -> bool {
        self.handlers
            .get(&hook)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Returns the number of handlers registered for a hook event.
    pub fn handler_count(&self, hook: HookEvent) -> usize {
        self.handlers.get(&hook).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns all hook events with at least one handler.
    pub fn registered_hooks(&self) -> Vec<HookEvent> {
        self.handlers.keys().copied().collect()
    }

    /// Runs the handlers of `hook` against `payload`, stopping at the first
    /// failure and returning it.
    pub async fn trigger(&self, hook: HookEvent, payload: &mut HookPayload) -> AppResult<()> {
        payload.event = hook;
        debug!(hook = %hook, verb = %payload.verb, "Triggering hook");
        let result = HookDispatcher::new(self).fire_or_halt(payload).await?;
        debug!(hook = %hook, completed = result.completed, "Hook chain completed");
        Ok(())
    }
}
