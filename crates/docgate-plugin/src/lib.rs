//! # docgate-plugin
//!
//! Hook and plugin framework for docgate collections. Provides:
//!
//! - The fixed set of hook events and the per-invocation payload
//! - Hook registry with priority-ordered registration
//! - Sequential hook dispatcher with first-failure short-circuit
//! - Plugin registry mapping names to factories, and the plugin loader
//! - Built-in `audit` and `timestamps` plugins

pub mod builtin;
pub mod hooks;
pub mod loader;
pub mod prelude;
pub mod registry;
pub mod traits;

pub use hooks::definitions::{HookAction, HookEvent, HookPayload, HookResult};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::{HookHandler, HookRegistry};
pub use loader::{PluginLoader, PluginRef};
pub use registry::{Plugin, PluginHost, PluginInfo, PluginRegistry};
