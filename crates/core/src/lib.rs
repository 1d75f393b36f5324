//! Pure domain logic for the scriptd run orchestrator.
//!
//! No database access lives here; the `db` crate depends on this crate for
//! shared types and errors, and the `api` crate uses the environment
//! overlay, log store, and metadata parser when driving executions.

pub mod env;
pub mod error;
pub mod hashing;
pub mod logs;
pub mod metadata;
pub mod types;
