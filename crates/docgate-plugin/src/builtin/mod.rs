//! Built-in plugins available by name from [`PluginRegistry::with_builtins`].
//!
//! [`PluginRegistry::with_builtins`]: crate::registry::PluginRegistry::with_builtins

pub mod audit;
pub mod timestamps;

use std::sync::Arc;

use tracing::error;

use crate::registry::{Plugin, PluginRegistry};

pub use audit::AuditPlugin;
pub use timestamps::TimestampsPlugin;

/// Registers every built-in plugin.
pub(crate) fn register_all(registry: &mut PluginRegistry) {
    let results = [
        registry.register(audit::PLUGIN_ID, || {
            Ok(Arc::new(AuditPlugin) as Arc<dyn Plugin>)
        }),
        registry.register(timestamps::PLUGIN_ID, || {
            Ok(Arc::new(TimestampsPlugin) as Arc<dyn Plugin>)
        }),
    ];

    for result in results {
        if let Err(e) = result {
            error!(error = %e, "Failed to register built-in plugin");
        }
    }
}
