//! Document and option-bag representations.
//!
//! Documents, filters, and store results travel as `serde_json` values so
//! that docgate stays independent of any particular driver's BSON types.

use serde_json::{Map, Value};

/// A single document (a JSON object).
pub type Document = Map<String, Value>;

/// A caller-supplied options bag.
pub type Options = Map<String, Value>;

/// Option key requesting the bare document(s) instead of the raw result.
pub const RETURN_DOCS_ONLY: &str = "returnDocsOnly";

/// Option key requesting the normalized summary instead of the raw result.
pub const RETURN_RESULT_ONLY: &str = "returnResultOnly";

/// Option key carrying the store's upsert flag.
pub const UPSERT: &str = "upsert";

/// Returns whether a key names an update operator (`$set`, `$inc`, ...).
pub fn is_operator_key(key: &str) -> bool {
    key.starts_with('$')
}

/// Returns whether every key of a non-empty document is an update operator.
pub fn is_modifier_document(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| is_operator_key(k))
}
