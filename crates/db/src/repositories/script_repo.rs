//! Repository for the `scripts` table.

use sqlx::PgPool;

use scriptd_core::types::DbId;

use crate::models::script::{CreateScript, Script};

/// Column list for `scripts` SELECT queries.
const COLUMNS: &str = "\
    id, name, description, file_path, checksum, metadata, \
    timeout_secs, created_at, updated_at";

/// Provides CRUD operations for the script registry.
pub struct ScriptRepo;

impl ScriptRepo {
    /// Insert a new script into the registry.
    pub async fn create(pool: &PgPool, dto: &CreateScript) -> Result<Script, sqlx::Error> {
        let query = format!(
            "INSERT INTO scripts (name, description, file_path, checksum, metadata, timeout_secs) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Script>(&query)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(&dto.file_path)
            .bind(&dto.checksum)
            .bind(&dto.metadata)
            .bind(dto.timeout_secs.unwrap_or(300))
            .fetch_one(pool)
            .await
    }

    /// Find a script by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE id = $1");
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a script by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE name = $1");
        sqlx::query_as::<_, Script>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all registered scripts, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts ORDER BY name");
        sqlx::query_as::<_, Script>(&query).fetch_all(pool).await
    }

    /// Delete a script row. Returns `false` if no row matched.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query("DELETE FROM scripts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}
