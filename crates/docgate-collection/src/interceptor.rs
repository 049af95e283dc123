//! Error interception: routes operational failures through the `error` hook.

use serde_json::Value;
use tracing::{debug, warn};

use docgate_core::error::AppError;
use docgate_plugin::hooks::definitions::{HookEvent, HookPayload, keys};
use docgate_plugin::hooks::registry::HookRegistry;

/// Reports a failure to the `error` listeners of a collection.
///
/// Listeners see the operation fields, the collection namespace under `ns`,
/// and a copy of the failure. A listener that fails (or halts) replaces the
/// failure delivered to the caller; if every listener continues, the
/// original failure is delivered.
#[derive(Debug)]
pub struct ErrorInterceptor<'a> {
    hooks: &'a HookRegistry,
    namespace: &'a str,
}

impl<'a> ErrorInterceptor<'a> {
    pub fn new(hooks: &'a HookRegistry, namespace: &'a str) -> Self {
        Self { hooks, namespace }
    }

    /// Runs the `error` event for `error` and returns the failure the caller
    /// should receive.
    pub async fn intercept(&self, mut payload: HookPayload, error: AppError) -> AppError {
        payload.set_data(keys::NS, Value::String(self.namespace.to_string()));
        payload.error = Some(error.clone());

        match self.hooks.trigger(HookEvent::Error, &mut payload).await {
            Ok(()) => {
                debug!(
                    ns = %self.namespace,
                    verb = %payload.verb,
                    error = %error,
                    "Failure observed by error hook"
                );
                error
            }
            Err(translated) => {
                warn!(
                    ns = %self.namespace,
                    verb = %payload.verb,
                    original = %error,
                    translated = %translated,
                    "Error hook replaced failure"
                );
                translated
            }
        }
    }
}
