//! The per-verb lifecycle every collection operation runs through.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::DocumentStore;
use docgate_core::types::{Options, Verb};
use docgate_plugin::hooks::definitions::{HookEvent, HookPayload, keys};
use docgate_plugin::hooks::registry::HookRegistry;

use crate::interceptor::ErrorInterceptor;
use crate::options::OptionExtractor;
use crate::result::normalize;
use crate::upsert::UpsertCoordinator;
use crate::validation::validate;

/// Borrowed view of a collection that executes one operation.
pub(crate) struct OperationWrapper<'a> {
    pub store: &'a dyn DocumentStore,
    pub hooks: &'a HookRegistry,
    pub allowed: Option<&'a HashSet<Verb>>,
    pub namespace: &'a str,
}

impl OperationWrapper<'_> {
    /// Runs `payload.verb` to completion.
    ///
    /// `payload` holds the operation fields (filter, document(s), update or
    /// replacement); `options` is the caller's options bag.
    pub async fn execute(
        &self,
        mut payload: HookPayload,
        options: Option<Options>,
    ) -> AppResult<Value> {
        let verb = payload.verb;

        if self.allowed.is_some_and(|allowed| !allowed.contains(&verb)) {
            debug!(ns = %self.namespace, verb = %verb, "Verb not allowed");
            return Err(AppError::unsupported_method(format!(
                "{verb} is not supported on {}",
                self.namespace
            )));
        }

        let options = options.unwrap_or_default();
        if let Err(e) = validate(verb, &payload, &options) {
            return Err(self.fail(payload, e).await);
        }

        let (flags, residual) = OptionExtractor::extract(&options);
        payload.set_data(keys::OPTIONS, Value::Object(residual));

        if let Err(e) = self.hooks.trigger(HookEvent::before(verb), &mut payload).await {
            return Err(self.fail(payload, e).await);
        }

        let raw = match self.delegate(&payload).await {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(payload, e).await),
        };

        let normalized = match normalize(verb, &payload, &raw) {
            Ok(normalized) => normalized,
            Err(e) => return Err(self.fail(payload, e).await),
        };
        payload.set_data(keys::RESULT, normalized.result);
        for (key, value) in normalized.extras {
            payload.set_data(key, value);
        }

        if let Err(e) = self.hooks.trigger(HookEvent::after(verb), &mut payload).await {
            return Err(self.fail(payload, e).await);
        }

        if flags.unwraps(verb.result_shape()) {
            Ok(payload.data.remove(keys::RESULT).unwrap_or(Value::Null))
        } else {
            Ok(raw)
        }
    }

    /// Calls the store with the (possibly rewritten) payload fields.
    async fn delegate(&self, payload: &HookPayload) -> AppResult<Value> {
        let verb = payload.verb;
        let empty = Options::new();
        let options = payload.options().unwrap_or(&empty);

        debug!(ns = %self.namespace, verb = %verb, "Calling store");

        match verb {
            Verb::InsertOne => self.store.insert_one(field(payload, keys::DOC)?, options).await,
            Verb::InsertMany => {
                self.store
                    .insert_many(field(payload, keys::DOCS)?, options)
                    .await
            }
            Verb::UpdateOne => {
                self.store
                    .update_one(
                        field(payload, keys::FILTER)?,
                        field(payload, keys::UPDATE)?,
                        options,
                    )
                    .await
            }
            Verb::UpdateMany => {
                self.store
                    .update_many(
                        field(payload, keys::FILTER)?,
                        field(payload, keys::UPDATE)?,
                        options,
                    )
                    .await
            }
            Verb::DeleteOne => {
                self.store
                    .delete_one(field(payload, keys::FILTER)?, options)
                    .await
            }
            Verb::DeleteMany => {
                self.store
                    .delete_many(field(payload, keys::FILTER)?, options)
                    .await
            }
            Verb::ReplaceOne => {
                self.store
                    .replace_one(
                        field(payload, keys::FILTER)?,
                        field(payload, keys::REPLACEMENT)?,
                        options,
                    )
                    .await
            }
            Verb::FindOneAndUpdate => {
                self.store
                    .find_one_and_update(
                        field(payload, keys::FILTER)?,
                        field(payload, keys::UPDATE)?,
                        options,
                    )
                    .await
            }
            Verb::FindOneAndDelete => {
                self.store
                    .find_one_and_delete(field(payload, keys::FILTER)?, options)
                    .await
            }
            Verb::FindOneAndReplace => {
                self.store
                    .find_one_and_replace(
                        field(payload, keys::FILTER)?,
                        field(payload, keys::REPLACEMENT)?,
                        options,
                    )
                    .await
            }
            Verb::UpsertOne => {
                let outcome = UpsertCoordinator::new(self.store)
                    .run(field(payload, keys::FILTER)?, field(payload, keys::DOC)?, options)
                    .await?;
                debug!(
                    ns = %self.namespace,
                    path = ?outcome.path,
                    attempts = outcome.attempts,
                    "Upsert completed"
                );
                Ok(outcome.raw)
            }
        }
    }

    async fn fail(&self, payload: HookPayload, error: AppError) -> AppError {
        warn!(
            ns = %self.namespace,
            verb = %payload.verb,
            invocation_id = %payload.invocation_id,
            error = %error,
            "Operation failed"
        );
        ErrorInterceptor::new(self.hooks, self.namespace)
            .intercept(payload, error)
            .await
    }
}

/// Reads an operation field a before-listener may have removed.
fn field<'p>(payload: &'p HookPayload, key: &str) -> AppResult<&'p Value> {
    payload.get_data(key).ok_or_else(|| {
        AppError::invalid_argument(format!(
            "{} is missing '{key}' after the before-hook",
            payload.verb
        ))
    })
}
