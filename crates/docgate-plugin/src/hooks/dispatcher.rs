//! Hook dispatcher: runs an event's handlers in sequence.
//!
//! - Handlers are called one at a time, in priority order, each with the
//!   same payload, so changes made by one handler are visible to the next.
//! - The first handler that returns `Halt` or `Err` stops the chain; later
//!   handlers are skipped.
//! - `Halt` becomes a hook-rejection error naming the plugin; `Err` is
//!   propagated unchanged.

use tracing::{debug, info, warn};

use docgate_core::error::AppError;

use super::definitions::{HookAction, HookPayload};
use super::registry::HookRegistry;

/// Outcome of dispatching an event to its handlers.
#[derive(Debug, Default)]
pub struct DispatchResult {
    /// Number of handlers that ran to completion with `Continue`.
    pub completed: usize,
    /// Plugin whose handler stopped the chain (if any).
    pub halted_by: Option<String>,
    /// The failure that stopped the chain (if any).
    pub failure: Option<AppError>,
}

impl DispatchResult {
    /// Returns whether a handler stopped the chain.
    pub fn halted(&self) -> bool {
        self.failure.is_some()
    }
}

/// Dispatches an event to the handlers of a registry.
#[derive(Debug)]
pub struct HookDispatcher<'a> {
    /// Hook registry.
    registry: &'a HookRegistry,
}

impl<'a> HookDispatcher<'a> {
    /// Creates a dispatcher over `registry`.
    pub fn new(registry: &'a HookRegistry) -> Self {
        Self { registry }
    }

    /// Runs the handlers for `payload.event` until one fails.
    pub async fn dispatch(&self, payload: &mut HookPayload) -> DispatchResult {
        let handlers = self.registry.get_handlers(payload.event);

        if handlers.is_empty() {
            return DispatchResult::default();
        }

        debug!(
            hook = %payload.event,
            handler_count = handlers.len(),
            "Dispatching hook"
        );

        let mut result = DispatchResult::default();

        for handler in &handlers {
            match handler.handle(payload).await {
                Ok(HookAction::Continue) => {
                    debug!(
                        hook = %payload.event,
                        plugin_id = %handler.plugin_id(),
                        "Handler returned Continue"
                    );
                    result.completed += 1;
                }
                Ok(HookAction::Halt { reason }) => {
                    info!(
                        hook = %payload.event,
                        plugin_id = %handler.plugin_id(),
                        reason = %reason,
                        "Handler halted execution"
                    );
                    result.halted_by = Some(handler.plugin_id().to_string());
                    result.failure = Some(AppError::hook_rejection(format!(
                        "Operation blocked by plugin '{}': {}",
                        handler.plugin_id(),
                        reason
                    )));
                    break;
                }
                Err(e) => {
                    warn!(
                        hook = %payload.event,
                        plugin_id = %handler.plugin_id(),
                        error = %e,
                        "Handler failed"
                    );
                    result.halted_by = Some(handler.plugin_id().to_string());
                    result.failure = Some(e);
                    break;
                }
            }
        }

        result
    }

    /// Dispatches and converts a stopped chain into its error.
    pub async fn fire_or_halt(&self, payload: &mut HookPayload) -> Result<DispatchResult, AppError> {
        let mut result = self.dispatch(payload).await;

        match result.failure.take() {
            Some(err) => {
                debug!(
                    hook = %payload.event,
                    halted_by = result.halted_by.as_deref().unwrap_or("unknown"),
                    completed = result.completed,
                    "Hook chain stopped"
                );
                Err(err)
            }
            None => Ok(result),
        }
    }
}
