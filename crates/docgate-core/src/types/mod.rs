//! Core type definitions used across the docgate workspace.

pub mod document;
pub mod verb;

pub use document::{Document, Options};
pub use verb::{LegacyMethod, ResultShape, Verb};
