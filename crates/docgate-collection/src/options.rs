//! Option extraction: split collection-level control flags from the
//! options forwarded to the store.

use serde_json::Value;

use docgate_core::types::document::{RETURN_DOCS_ONLY, RETURN_RESULT_ONLY};
use docgate_core::types::{Options, ResultShape};

/// Control flags recognized by the collection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlags {
    /// Unwrap insert and find-one results to the bare document(s).
    pub return_docs_only: bool,
    /// Unwrap update, replace, and delete results to the normalized summary.
    pub return_result_only: bool,
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self {
            return_docs_only: true,
            return_result_only: true,
        }
    }
}

impl ControlFlags {
    /// Returns whether a result of `shape` should be delivered normalized
    /// rather than as the store's raw result.
    pub fn unwraps(&self, shape: ResultShape) -> bool {
        match shape {
            ResultShape::Documents | ResultShape::Document => self.return_docs_only,
            ResultShape::Summary => self.return_result_only,
        }
    }
}

/// Splits caller options without mutating them.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionExtractor;

impl OptionExtractor {
    /// Returns the control flags and the residual options.
    ///
    /// Only an explicit `false` turns a flag off; any other value, or
    /// absence, keeps the default of `true`.
    pub fn extract(options: &Options) -> (ControlFlags, Options) {
        let flag = |key: &str| !matches!(options.get(key), Some(Value::Bool(false)));

        let flags = ControlFlags {
            return_docs_only: flag(RETURN_DOCS_ONLY),
            return_result_only: flag(RETURN_RESULT_ONLY),
        };

        let residual = options
            .iter()
            .filter(|(k, _)| k.as_str() != RETURN_DOCS_ONLY && k.as_str() != RETURN_RESULT_ONLY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        (flags, residual)
    }
}
