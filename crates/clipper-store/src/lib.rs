//! JSON-file job persistence.
//!
//! One file holds every job, keyed by id. All access goes through
//! [`JobStore`], which serializes load-mutate-persist cycles behind a
//! single async mutex and writes atomically via a temp file + rename.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::JobStore;
