//! Route definitions for script registry endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::scripts;
use crate::state::AppState;

/// Routes mounted at `/scripts`.
///
/// ```text
/// POST   /          -> register_script
/// GET    /          -> list_scripts
/// GET    /{id}      -> get_script
/// DELETE /{id}      -> delete_script
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(scripts::list_scripts).post(scripts::register_script),
        )
        .route(
            "/{id}",
            get(scripts::get_script).delete(scripts::delete_script),
        )
}
