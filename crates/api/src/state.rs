use std::sync::Arc;

use scriptd_core::logs::LogStore;

use crate::config::ServerConfig;
use crate::engine::RunEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: scriptd_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The run-execution engine (queue + background worker).
    pub engine: Arc<RunEngine>,
    /// Per-run log storage, shared with the engine.
    pub logs: LogStore,
}
