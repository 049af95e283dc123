//! Plugin references in collection configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plugin to apply to a collection at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Plugin reference: a registered plugin name, or `{ name = "..." }`.
    ///
    /// Kept untyped so that malformed references surface as an
    /// invalid-plugin error from the loader rather than a parse failure.
    pub plugin: Value,
    /// Options handed to the plugin when it is applied.
    #[serde(default = "empty_options")]
    pub options: Value,
}

impl PluginSpec {
    /// Creates a spec referencing a plugin by name with empty options.
    pub fn named(name: &str) -> Self {
        Self {
            plugin: Value::String(name.to_string()),
            options: empty_options(),
        }
    }
}

fn empty_options() -> Value {
    Value::Object(serde_json::Map::new())
}
