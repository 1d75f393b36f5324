//! Handlers for run submission and inspection.
//!
//! Submission is fire-and-forget: the handler persists a QUEUED record and
//! hands the id to the engine exactly once. All later failure information
//! is discoverable by polling the run's status and log, never through the
//! submission response.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use scriptd_core::error::CoreError;
use scriptd_core::types::DbId;
use scriptd_db::models::run::{CreateRun, Run};
use scriptd_db::repositories::{RunRepo, ScriptRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for run submission.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRunRequest {
    /// String-to-string parameters; only allow-listed keys ever reach the
    /// child process environment.
    pub params: Option<BTreeMap<String, String>>,
}

/// POST /runs/script/{script_id}
///
/// Create a QUEUED run for a script and submit it to the engine.
pub async fn create_run(
    State(state): State<AppState>,
    Path(script_id): Path<DbId>,
    Json(input): Json<CreateRunRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Run>>)> {
    // The worker re-checks at execution time, but a dangling target at
    // submission time is a caller mistake worth a 404.
    ScriptRepo::find_by_id(&state.pool, script_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "script",
                id: script_id,
            })
        })?;

    let run = RunRepo::create(
        &state.pool,
        &CreateRun {
            target_id: script_id,
            params: input.params,
        },
    )
    .await?;

    state.engine.enqueue(run.id);

    Ok((StatusCode::CREATED, Json(DataResponse { data: run })))
}

/// GET /runs
///
/// List all runs, most recent first.
pub async fn list_runs(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Run>>>> {
    let runs = RunRepo::list_recent(&state.pool).await?;
    Ok(Json(DataResponse { data: runs }))
}

/// GET /runs/{id}
///
/// Get a specific run.
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Run>>> {
    let run = RunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "run", id }))?;

    Ok(Json(DataResponse { data: run }))
}

/// GET /runs/{id}/logs
///
/// Get the run's captured output as plain text. Never fails once the run
/// exists: absent or unreadable logs degrade to a placeholder string.
pub async fn get_run_logs(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<String> {
    let run = RunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "run", id }))?;

    let text = state
        .logs
        .read(run.log_path.as_deref().map(std::path::Path::new))
        .await;

    Ok(text)
}

/// POST /runs/{id}/cancel
///
/// Cancel a run that is still waiting in the queue. Runs that have already
/// started (or finished) cannot be canceled; the engine does not interrupt
/// a running child process.
pub async fn cancel_run(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Run>>> {
    // Distinguish "no such run" from "not cancelable".
    RunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "run", id }))?;

    if !RunRepo::cancel_queued(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Run {id} is not queued and cannot be canceled"
        ))));
    }

    let run = RunRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "run", id }))?;

    tracing::info!(run_id = id, "Run canceled");

    Ok(Json(DataResponse { data: run }))
}
