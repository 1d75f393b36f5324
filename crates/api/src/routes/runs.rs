//! Route definitions for run endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::runs;
use crate::state::AppState;

/// Routes mounted at `/runs`.
///
/// ```text
/// GET  /                       -> list_runs
/// POST /script/{script_id}     -> create_run
/// GET  /{id}                   -> get_run
/// GET  /{id}/logs              -> get_run_logs
/// POST /{id}/cancel            -> cancel_run
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(runs::list_runs))
        .route("/script/{script_id}", post(runs::create_run))
        .route("/{id}", get(runs::get_run))
        .route("/{id}/logs", get(runs::get_run_logs))
        .route("/{id}/cancel", post(runs::cancel_run))
}
