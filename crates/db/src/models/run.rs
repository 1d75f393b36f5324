//! Run entity models and DTOs.
//!
//! Models for the `runs` table: one row per execution attempt of a target
//! script, carrying its lifecycle status, timestamps, and log location.
//! The durable row is authoritative; the engine only holds run ids in
//! memory and re-reads the record at every transition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scriptd_core::types::{DbId, Timestamp};

/// A row from the `runs` table, including the joined status name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Run {
    pub id: DbId,
    /// Target kind; always `"script"` in the current design.
    pub target_type: String,
    /// Id of the targeted script.
    pub target_id: DbId,
    /// String-to-string parameters supplied at submission, stored as JSONB.
    pub params: Option<serde_json::Value>,
    pub status_id: i16,
    /// Joined from `run_statuses.name`.
    pub status_name: String,
    /// Set at most once, immediately before the child process is spawned.
    pub log_path: Option<String>,
    /// Set exactly once, at the transition to RUNNING.
    pub started_at: Option<Timestamp>,
    /// Set exactly once, at the terminal transition.
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new run in QUEUED state.
///
/// Parameters are a typed string-to-string mapping at this boundary; the
/// engine additionally allow-lists them before they reach a child process.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRun {
    pub target_id: DbId,
    pub params: Option<BTreeMap<String, String>>,
}
