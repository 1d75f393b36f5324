//! Script registry entity models and DTOs.
//!
//! Models for the `scripts` table: a registered executable file plus its
//! checksum and the optional metadata parsed from its comment front matter.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scriptd_core::types::{DbId, Timestamp};

/// A registered script in the registry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Script {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Absolute or data-dir-relative path of the executable file.
    pub file_path: String,
    /// SHA-256 hex digest of the registered content.
    pub checksum: String,
    /// Structured metadata parsed from the script's front matter, if any.
    pub metadata: Option<serde_json::Value>,
    /// Maximum wall-clock seconds a run of this script may take.
    pub timeout_secs: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new script into the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScript {
    pub name: String,
    pub description: Option<String>,
    pub file_path: String,
    pub checksum: String,
    pub metadata: Option<serde_json::Value>,
    pub timeout_secs: Option<i32>,
}
