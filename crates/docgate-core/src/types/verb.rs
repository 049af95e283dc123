//! The verbs a hooked collection exposes, and the legacy driver methods it
//! deliberately does not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A CRUD-style operation wrapped by the hook pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verb {
    /// Insert a single document.
    InsertOne,
    /// Insert an array of documents.
    InsertMany,
    /// Apply a modifier to the first matching document.
    UpdateOne,
    /// Apply a modifier to every matching document.
    UpdateMany,
    /// Delete the first matching document.
    DeleteOne,
    /// Delete every matching document.
    DeleteMany,
    /// Replace the first matching document.
    ReplaceOne,
    /// Apply a modifier to one document and return it.
    FindOneAndUpdate,
    /// Delete one document and return it.
    FindOneAndDelete,
    /// Replace one document and return it.
    FindOneAndReplace,
    /// Update-or-insert one document and return it.
    UpsertOne,
}

/// How a verb's normalized result is shaped, and which control flag selects
/// between it and the store's raw result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Bare inserted document or array (`returnDocsOnly`).
    Documents,
    /// Bare matched document from a find-one verb (`returnDocsOnly`).
    Document,
    /// Count summary (`returnResultOnly`).
    Summary,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 11] = [
        Verb::InsertOne,
        Verb::InsertMany,
        Verb::UpdateOne,
        Verb::UpdateMany,
        Verb::DeleteOne,
        Verb::DeleteMany,
        Verb::ReplaceOne,
        Verb::FindOneAndUpdate,
        Verb::FindOneAndDelete,
        Verb::FindOneAndReplace,
        Verb::UpsertOne,
    ];

    /// Returns the method name of this verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsertOne => "insertOne",
            Self::InsertMany => "insertMany",
            Self::UpdateOne => "updateOne",
            Self::UpdateMany => "updateMany",
            Self::DeleteOne => "deleteOne",
            Self::DeleteMany => "deleteMany",
            Self::ReplaceOne => "replaceOne",
            Self::FindOneAndUpdate => "findOneAndUpdate",
            Self::FindOneAndDelete => "findOneAndDelete",
            Self::FindOneAndReplace => "findOneAndReplace",
            Self::UpsertOne => "upsertOne",
        }
    }

    fn snake_name(&self) -> &'static str {
        match self {
            Self::InsertOne => "insert_one",
            Self::InsertMany => "insert_many",
            Self::UpdateOne => "update_one",
            Self::UpdateMany => "update_many",
            Self::DeleteOne => "delete_one",
            Self::DeleteMany => "delete_many",
            Self::ReplaceOne => "replace_one",
            Self::FindOneAndUpdate => "find_one_and_update",
            Self::FindOneAndDelete => "find_one_and_delete",
            Self::FindOneAndReplace => "find_one_and_replace",
            Self::UpsertOne => "upsert_one",
        }
    }

    /// Returns whether a caller-supplied `upsert` option must be rejected.
    ///
    /// Upserts are only permitted through [`Verb::UpsertOne`], which sets the
    /// flag itself.
    pub fn rejects_upsert_option(&self) -> bool {
        matches!(
            self,
            Self::UpdateOne
                | Self::UpdateMany
                | Self::ReplaceOne
                | Self::FindOneAndUpdate
                | Self::FindOneAndReplace
        )
    }

    /// Returns the shape of the verb's normalized result.
    pub fn result_shape(&self) -> ResultShape {
        match self {
            Self::InsertOne | Self::InsertMany => ResultShape::Documents,
            Self::UpdateOne
            | Self::UpdateMany
            | Self::DeleteOne
            | Self::DeleteMany
            | Self::ReplaceOne => ResultShape::Summary,
            Self::FindOneAndUpdate
            | Self::FindOneAndDelete
            | Self::FindOneAndReplace
            | Self::UpsertOne => ResultShape::Document,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = AppError;

    /// Parses a verb from its method name (`insertOne` or `insert_one`).
    ///
    /// Legacy driver method names are rejected with a hint naming the verb
    /// that replaces them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(verb) = Verb::ALL
            .iter()
            .find(|v| v.as_str() == s || v.snake_name() == s)
        {
            return Ok(*verb);
        }

        if let Some(legacy) = LegacyMethod::ALL.iter().find(|m| m.as_str() == s) {
            return Err(AppError::configuration(format!(
                "Method '{}' is deprecated, use '{}' instead",
                legacy.as_str(),
                legacy.replacement()
            )));
        }

        Err(AppError::configuration(format!("Unknown method '{s}'")))
    }
}

/// Deprecated driver methods that a hooked collection does not expose.
///
/// They bypass the hook pipeline in the underlying driver, so they are
/// listed here explicitly instead of being delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyMethod {
    /// `insert`, single document or array.
    Insert,
    /// `update`, single or multi.
    Update,
    /// `remove`.
    Remove,
    /// `save`, insert-or-replace by `_id`.
    Save,
    /// `findAndModify`.
    FindAndModify,
    /// `findAndRemove`.
    FindAndRemove,
}

impl LegacyMethod {
    /// Every legacy method.
    pub const ALL: [LegacyMethod; 6] = [
        LegacyMethod::Insert,
        LegacyMethod::Update,
        LegacyMethod::Remove,
        LegacyMethod::Save,
        LegacyMethod::FindAndModify,
        LegacyMethod::FindAndRemove,
    ];

    /// Returns the driver method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Save => "save",
            Self::FindAndModify => "findAndModify",
            Self::FindAndRemove => "findAndRemove",
        }
    }

    /// Returns the verb that replaces this method.
    pub fn replacement(&self) -> Verb {
        match self {
            Self::Insert => Verb::InsertMany,
            Self::Update => Verb::UpdateOne,
            Self::Remove => Verb::DeleteMany,
            Self::Save => Verb::UpsertOne,
            Self::FindAndModify => Verb::FindOneAndUpdate,
            Self::FindAndRemove => Verb::FindOneAndDelete,
        }
    }
}
