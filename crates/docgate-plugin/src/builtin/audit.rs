//! Audit plugin: logs every completed operation and every failure.
//!
//! The before-stage stamps the start time into `meta`; the after-stage reads
//! it back to report how long the store call and hooks took. Operations
//! slower than `slowThresholdMs` (default 500) are logged at warn level.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};

use docgate_core::result::AppResult;

use crate::hooks::definitions::{HookAction, HookEvent, HookPayload, HookResult};
use crate::hooks::registry::HookHandler;
use crate::registry::{Plugin, PluginHost, PluginInfo};

/// Registry name of the audit plugin.
pub const PLUGIN_ID: &str = "audit";

const STARTED_AT: &str = "auditStartedAt";
const DEFAULT_SLOW_THRESHOLD_MS: i64 = 500;

/// Logs completions and failures of every verb on a collection.
#[derive(Debug, Default)]
pub struct AuditPlugin;

impl Plugin for AuditPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: PLUGIN_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Logs completed operations and failures".to_string(),
        }
    }

    fn apply(&self, host: &mut dyn PluginHost, options: &Value) -> AppResult<()> {
        let slow_threshold_ms = options
            .get("slowThresholdMs")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_SLOW_THRESHOLD_MS);
        let ns = host.namespace().to_string();

        let start: Arc<dyn HookHandler> = Arc::new(StartTimer);
        let complete: Arc<dyn HookHandler> = Arc::new(LogCompletion {
            ns: ns.clone(),
            slow_threshold_ms,
        });

        for event in HookEvent::ALL {
            if event.is_before_hook() {
                host.on(event, start.clone());
            } else if event != HookEvent::Error {
                host.on(event, complete.clone());
            }
        }
        host.on(HookEvent::Error, Arc::new(LogFailure { ns }));

        Ok(())
    }
}

#[derive(Debug)]
struct StartTimer;

#[async_trait]
impl HookHandler for StartTimer {
    async fn handle(&self, payload: &mut HookPayload) -> HookResult {
        payload.set_meta(STARTED_AT, json!(Utc::now().timestamp_millis()));
        HookAction::continue_execution()
    }

    fn plugin_id(&self) -> &str {
        PLUGIN_ID
    }

    fn priority(&self) -> i32 {
        i32::MIN
    }
}

#[derive(Debug)]
struct LogCompletion {
    ns: String,
    slow_threshold_ms: i64,
}

#[async_trait]
impl HookHandler for LogCompletion {
    async fn handle(&self, payload: &mut HookPayload) -> HookResult {
        let elapsed_ms = elapsed_ms(payload);

        if elapsed_ms.is_some_and(|ms| ms >= self.slow_threshold_ms) {
            warn!(
                ns = %self.ns,
                verb = %payload.verb,
                invocation_id = %payload.invocation_id,
                elapsed_ms = ?elapsed_ms,
                "Slow operation"
            );
        } else {
            info!(
                ns = %self.ns,
                verb = %payload.verb,
                invocation_id = %payload.invocation_id,
                elapsed_ms = ?elapsed_ms,
                "Operation completed"
            );
        }

        HookAction::continue_execution()
    }

    fn plugin_id(&self) -> &str {
        PLUGIN_ID
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }
}

#[derive(Debug)]
struct LogFailure {
    ns: String,
}

#[async_trait]
impl HookHandler for LogFailure {
    async fn handle(&self, payload: &mut HookPayload) -> HookResult {
        let error = payload
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        warn!(
            ns = %self.ns,
            verb = %payload.verb,
            invocation_id = %payload.invocation_id,
            elapsed_ms = ?elapsed_ms(payload),
            error = %error,
            "Operation failed"
        );

        HookAction::continue_execution()
    }

    fn plugin_id(&self) -> &str {
        PLUGIN_ID
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }
}

fn elapsed_ms(payload: &HookPayload) -> Option<i64> {
    payload
        .get_meta(STARTED_AT)
        .and_then(|v| v.as_i64())
        .map(|started| Utc::now().timestamp_millis() - started)
}
