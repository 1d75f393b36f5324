pub mod health;
pub mod runs;
pub mod scripts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /scripts                     list, register
/// /scripts/{id}                get, delete
///
/// /runs                        list
/// /runs/script/{script_id}     submit a run (POST)
/// /runs/{id}                   get
/// /runs/{id}/logs              combined output as plain text
/// /runs/{id}/cancel            cancel a queued run (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/scripts", scripts::router())
        .nest("/runs", runs::router())
}
