//! Plugin registry: maps plugin names to factories, resolved at startup.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use docgate_core::error::AppError;
use docgate_core::result::AppResult;

use crate::hooks::definitions::HookEvent;
use crate::hooks::registry::HookHandler;

/// Metadata about a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin identifier.
    pub id: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    pub description: String,
}

impl PluginInfo {
    /// Creates metadata with only an identifier.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            version: "0.0.0".to_string(),
            description: String::new(),
        }
    }
}

/// The surface a plugin sees while it is applied to a collection.
pub trait PluginHost {
    /// Registers a handler for a hook event.
    fn on(&mut self, event: HookEvent, handler: Arc<dyn HookHandler>);

    /// Registers a handler for an event given by name.
    fn on_named(&mut self, event: &str, handler: Arc<dyn HookHandler>) -> AppResult<HookEvent>;

    /// Namespace of the collection being configured.
    fn namespace(&self) -> &str;
}

/// Trait that all plugins must implement.
///
/// `apply` runs synchronously once per collection the plugin is added to and
/// registers handlers through the host. An error aborts `add_plugin`.
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Registers the plugin's handlers on a collection.
    fn apply(&self, host: &mut dyn PluginHost, options: &Value) -> AppResult<()>;
}

/// Builds a plugin instance on demand.
pub type PluginFactory = Arc<dyn Fn() -> AppResult<Arc<dyn Plugin>> + Send + Sync>;

/// Registry of plugin factories keyed by plugin name.
#[derive(Default)]
pub struct PluginRegistry {
    /// Plugin name → factory.
    factories: HashMap<String, PluginFactory>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_all(&mut registry);
        registry
    }

    /// Registers a factory under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F) -> AppResult<()>
    where
        F: Fn() -> AppResult<Arc<dyn Plugin>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(AppError::plugin(format!(
                "Plugin '{}' is already registered",
                name
            )));
        }

        info!(plugin = %name, "Registering plugin factory");

        self.factories.insert(name.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Registers a ready-made plugin instance under its own id.
    pub fn register_instance(&mut self, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let name = plugin.info().id;
        self.register(&name, move || Ok(Arc::clone(&plugin)))
    }

    /// Resolves a plugin by name.
    ///
    /// Unknown names fail with a plugin-not-found error; a failing factory's
    /// error is returned unchanged.
    pub fn resolve(&self, name: &str) -> AppResult<Arc<dyn Plugin>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AppError::plugin_not_found(format!("Plugin '{}' not found", name)))?;
        factory()
    }

    /// Checks whether a plugin name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered plugin names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns plugin count.
    pub fn count(&self) -> usize {
        self.factories.len()
    }
}
