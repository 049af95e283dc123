//! Core traits defined in `docgate-core` and implemented by store adapters.

pub mod store;

pub use store::DocumentStore;
