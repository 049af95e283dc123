//! # docgate-collection
//!
//! A document-store collection wrapped in a hook pipeline. Every verb runs:
//!
//! 1. support check against the collection's allow-list
//! 2. argument validation
//! 3. option extraction (`returnDocsOnly`, `returnResultOnly`)
//! 4. before-hooks
//! 5. the store call (upserts retry once on a duplicate-key race)
//! 6. result normalization
//! 7. after-hooks
//! 8. delivery of the normalized or raw result
//!
//! Every failure after step 1 passes through the `error` hook first.

pub mod collection;
pub mod interceptor;
pub mod options;
pub mod result;
pub mod upsert;
mod validation;
mod wrapper;

pub use collection::HookedCollection;
pub use interceptor::ErrorInterceptor;
pub use options::{ControlFlags, OptionExtractor};
pub use result::{DeleteSummary, FindOneOutcome, UpdateSummary};
pub use upsert::{UpsertCoordinator, UpsertOutcome, UpsertPath};
