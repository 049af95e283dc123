//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use docgate_core::config::LoggingConfig;
use docgate_core::error::AppError;
use docgate_core::result::AppResult;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. `format = "json"` emits
/// one JSON object per event; anything else uses the pretty formatter.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.map_err(|e| {
        AppError::configuration(format!("Failed to install tracing subscriber: {e}"))
    })?;

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
