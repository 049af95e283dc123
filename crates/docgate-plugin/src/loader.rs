//! Plugin loader: resolves plugin references and applies them to a host.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use docgate_core::config::PluginSpec;
use docgate_core::error::AppError;
use docgate_core::result::AppResult;

use crate::registry::{Plugin, PluginHost, PluginInfo, PluginRegistry};

/// A reference to a plugin: a registered name or a plugin value.
#[derive(Debug, Clone)]
pub enum PluginRef {
    /// Resolved through the [`PluginRegistry`].
    Named(String),
    /// Applied as-is.
    Direct(Arc<dyn Plugin>),
}

impl From<&str> for PluginRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for PluginRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Plugin>> for PluginRef {
    fn from(plugin: Arc<dyn Plugin>) -> Self {
        Self::Direct(plugin)
    }
}

impl TryFrom<&Value> for PluginRef {
    type Error = AppError;

    /// Reads a reference from configuration: `"audit"` or `{"name": "audit"}`.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(name) => Ok(Self::Named(name.clone())),
            Value::Object(map) => match map.get("name").and_then(|n| n.as_str()) {
                Some(name) => Ok(Self::Named(name.to_string())),
                None => Err(AppError::invalid_plugin(format!(
                    "Plugin reference {value} has no 'name'"
                ))),
            },
            other => Err(AppError::invalid_plugin(format!(
                "Plugin reference {other} is neither a name nor a plugin"
            ))),
        }
    }
}

/// Resolves plugin references against a registry and applies them.
#[derive(Debug, Clone)]
pub struct PluginLoader {
    /// Plugin registry used for named references.
    registry: Arc<PluginRegistry>,
}

impl PluginLoader {
    /// Creates a loader over `registry`.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves a reference to a plugin instance.
    pub fn resolve(&self, plugin: PluginRef) -> AppResult<Arc<dyn Plugin>> {
        match plugin {
            PluginRef::Named(name) => self.registry.resolve(&name),
            PluginRef::Direct(plugin) => Ok(plugin),
        }
    }

    /// Resolves `plugin` and applies it to `host` with `options`.
    ///
    /// Resolution and apply failures are returned unchanged.
    pub fn load(
        &self,
        host: &mut dyn PluginHost,
        plugin: PluginRef,
        options: &Value,
    ) -> AppResult<PluginInfo> {
        let plugin = self.resolve(plugin)?;
        let info = plugin.info();

        plugin.apply(host, options)?;

        info!(
            plugin_id = %info.id,
            version = %info.version,
            ns = %host.namespace(),
            "Plugin applied"
        );

        Ok(info)
    }

    /// Loads a plugin described by configuration.
    pub fn load_spec(&self, host: &mut dyn PluginHost, spec: &PluginSpec) -> AppResult<PluginInfo> {
        let plugin = PluginRef::try_from(&spec.plugin)?;
        self.load(host, plugin, &spec.options)
    }

    /// Returns the plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new(Arc::new(PluginRegistry::with_builtins()))
    }
}
