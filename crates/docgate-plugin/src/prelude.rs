//! Prelude for plugin authors.

pub use async_trait::async_trait;

pub use crate::hooks::definitions::{HookAction, HookEvent, HookPayload, HookResult, keys};
pub use crate::hooks::registry::HookHandler;
pub use crate::registry::{Plugin, PluginHost, PluginInfo};
pub use crate::traits::{ClosureHandler, PluginFn};
