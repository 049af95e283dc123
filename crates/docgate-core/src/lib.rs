//! # docgate-core
//!
//! Core crate for docgate. Contains the document store trait, configuration
//! schemas, the verb catalogue, shared document types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other docgate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
