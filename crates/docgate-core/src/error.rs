//! Unified error types for docgate.
//!
//! Store adapters, hook handlers, and plugins all report failures as
//! [`AppError`], so a single value can travel through the `error` hook and
//! back to the caller unchanged.

use std::fmt;
use thiserror::Error;

/// Error code the document store uses to report a duplicate key.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Error kind categorization used across docgate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The verb is excluded by the collection's allow-list.
    UnsupportedMethod,
    /// An argument has the wrong shape for the verb.
    InvalidArgument,
    /// A caller passed an `upsert` option to a verb that does not upsert.
    UpsertOptionConflict,
    /// A duplicate-key race that persisted through the single retry.
    DuplicateKeyRace,
    /// A before/after hook handler halted the operation.
    HookRejection,
    /// Failure reported by the underlying document store.
    Store,
    /// A hook event name outside the fixed event set.
    UnknownEvent,
    /// No plugin is registered under the requested name.
    PluginNotFound,
    /// A plugin reference that cannot be resolved to a plugin.
    InvalidPlugin,
    /// A plugin failed while being applied.
    Plugin,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedMethod => write!(f, "UNSUPPORTED_METHOD"),
            Self::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            Self::UpsertOptionConflict => write!(f, "UPSERT_OPTION_CONFLICT"),
            Self::DuplicateKeyRace => write!(f, "DUPLICATE_KEY_RACE"),
            Self::HookRejection => write!(f, "HOOK_REJECTION"),
            Self::Store => write!(f, "STORE"),
            Self::UnknownEvent => write!(f, "UNKNOWN_EVENT"),
            Self::PluginNotFound => write!(f, "PLUGIN_NOT_FOUND"),
            Self::InvalidPlugin => write!(f, "INVALID_PLUGIN"),
            Self::Plugin => write!(f, "PLUGIN"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout docgate.
///
/// Store adapters attach the store's numeric error code with
/// [`AppError::with_code`]; the upsert path inspects it to detect
/// duplicate-key races.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Numeric error code reported by the store, if any.
    pub code: Option<i32>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a store error code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Create an unsupported-method error.
    pub fn unsupported_method(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMethod, message)
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create an upsert-option-conflict error.
    pub fn upsert_option_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpsertOptionConflict, message)
    }

    /// Create a duplicate-key-race error wrapping the store's last failure.
    pub fn duplicate_key_race(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(ErrorKind::DuplicateKeyRace, message, source)
            .with_code(DUPLICATE_KEY_CODE)
    }

    /// Create a hook-rejection error.
    pub fn hook_rejection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HookRejection, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create a store error carrying the duplicate-key code.
    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::store(message).with_code(DUPLICATE_KEY_CODE)
    }

    /// Create an unknown-event error.
    pub fn unknown_event(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownEvent, message)
    }

    /// Create a plugin-not-found error.
    pub fn plugin_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginNotFound, message)
    }

    /// Create an invalid-plugin error.
    pub fn invalid_plugin(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPlugin, message)
    }

    /// Create a plugin error.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Plugin, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns whether the store reported a duplicate key.
    pub fn is_duplicate_key(&self) -> bool {
        self.code == Some(DUPLICATE_KEY_CODE)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            code: self.code,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
