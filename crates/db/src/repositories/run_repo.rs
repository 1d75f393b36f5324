//! Repository for the `runs` table.
//!
//! Status transitions are guarded in SQL (`WHERE status_id = ...`) so they
//! stay monotonic even if two writers race: a guard miss returns `false`
//! and the caller decides what that means (typically "the run was canceled
//! while queued").

use sqlx::PgPool;

use scriptd_core::types::DbId;

use crate::models::run::{CreateRun, Run};
use crate::models::status::RunStatus;

/// Column list for `runs` SELECT queries, including the joined status name.
const COLUMNS: &str = "\
    r.id, r.target_type, r.target_id, r.params, \
    r.status_id, rs.name AS status_name, \
    r.log_path, r.started_at, r.finished_at, r.created_at";

/// Join clause used in all read queries to include the status name.
const JOIN: &str = "runs r JOIN run_statuses rs ON r.status_id = rs.id";

/// Provides persistence operations for run records.
pub struct RunRepo;

impl RunRepo {
    /// Insert a new run in QUEUED state and return the full record.
    pub async fn create(pool: &PgPool, dto: &CreateRun) -> Result<Run, sqlx::Error> {
        let params = dto
            .params
            .as_ref()
            .map(|p| serde_json::to_value(p).unwrap_or_default());

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO runs (target_type, target_id, params, status_id) \
             VALUES ('script', $1, $2, $3) \
             RETURNING id",
        )
        .bind(dto.target_id)
        .bind(params)
        .bind(RunStatus::Queued.id())
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a run by its ID, including the joined status name.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Run>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {JOIN} WHERE r.id = $1");
        sqlx::query_as::<_, Run>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all runs, most recently created first.
    pub async fn list_recent(pool: &PgPool) -> Result<Vec<Run>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {JOIN} ORDER BY r.created_at DESC, r.id DESC");
        sqlx::query_as::<_, Run>(&query).fetch_all(pool).await
    }

    /// Transition QUEUED -> RUNNING, setting `started_at`.
    ///
    /// Returns `false` if the run is not QUEUED (e.g. it was canceled while
    /// waiting in the queue), in which case the caller must not execute it.
    pub async fn mark_running(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query(
            "UPDATE runs SET status_id = $2, started_at = now() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(RunStatus::Running.id())
        .bind(RunStatus::Queued.id())
        .execute(pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    /// Persist the log file location onto the run record.
    ///
    /// Called once, immediately before the child process is spawned, so
    /// concurrent readers can observe the path mid-run.
    pub async fn set_log_path(pool: &PgPool, id: DbId, log_path: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE runs SET log_path = $2 WHERE id = $1")
            .bind(id)
            .bind(log_path)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Transition RUNNING -> a terminal status, setting `finished_at`.
    ///
    /// Returns `false` if the run was not RUNNING.
    pub async fn finish(pool: &PgPool, id: DbId, status: RunStatus) -> Result<bool, sqlx::Error> {
        debug_assert!(status.is_terminal());

        let rows = sqlx::query(
            "UPDATE runs SET status_id = $2, finished_at = now() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(status.id())
        .bind(RunStatus::Running.id())
        .execute(pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    /// Cancel a run that is still QUEUED.
    ///
    /// CANCELED is terminal, so `finished_at` is set; `started_at` stays
    /// NULL because execution never began. Returns `false` if the run had
    /// already left the queue.
    pub async fn cancel_queued(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query(
            "UPDATE runs SET status_id = $2, finished_at = now() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(RunStatus::Canceled.id())
        .bind(RunStatus::Queued.id())
        .execute(pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    /// Mark every RUNNING run as FAILED, setting `finished_at`.
    ///
    /// Reconciliation pass for worker crashes: after a restart of this
    /// single-lane executor no row can legitimately be RUNNING, so any that
    /// are were orphaned mid-execution. Returns the number of rows fixed.
    pub async fn fail_stale_running(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let rows = sqlx::query(
            "UPDATE runs SET status_id = $1, finished_at = now() \
             WHERE status_id = $2",
        )
        .bind(RunStatus::Failed.id())
        .bind(RunStatus::Running.id())
        .execute(pool)
        .await?
        .rows_affected();

        Ok(rows)
    }
}
