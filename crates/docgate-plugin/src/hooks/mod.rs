//! Hook system: registry, dispatcher, and typed hook definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{HookAction, HookEvent, HookPayload, HookResult, keys};
pub use dispatcher::{DispatchResult, HookDispatcher};
pub use registry::{DEFAULT_PRIORITY, HookHandler, HookRegistry};
