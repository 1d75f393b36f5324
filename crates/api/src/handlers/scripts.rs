//! Handlers for script registry management.
//!
//! Registration takes the script body inline: the server writes it to the
//! data directory, marks it executable, fingerprints it, and parses any
//! YAML front matter from its leading comments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use scriptd_core::error::CoreError;
use scriptd_core::hashing::sha256_hex;
use scriptd_core::metadata::parse_script_metadata;
use scriptd_core::types::DbId;
use scriptd_db::models::script::{CreateScript, Script};
use scriptd_db::repositories::ScriptRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for script registration.
#[derive(Debug, Deserialize)]
pub struct RegisterScriptRequest {
    pub name: String,
    pub description: Option<String>,
    /// Full script content; written verbatim to disk.
    pub content: String,
    /// Maximum run duration in seconds (default 300).
    pub timeout_secs: Option<i32>,
}

/// Validate a script name.
///
/// The name becomes part of an on-disk filename, so the charset is
/// restricted: alphanumeric, hyphen, underscore, or dot only.
fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Script name must not be empty".to_string(),
        ));
    }
    if name.len() > 128 {
        return Err(CoreError::Validation(
            "Script name must not exceed 128 characters".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(CoreError::Validation(
            "Script name may only contain alphanumeric, hyphen, underscore, or dot characters"
                .to_string(),
        ));
    }
    Ok(())
}

/// POST /scripts
///
/// Register a new script: write its content under the data directory,
/// make it executable, and create the registry record.
pub async fn register_script(
    State(state): State<AppState>,
    Json(input): Json<RegisterScriptRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Script>>)> {
    validate_name(&input.name)?;

    if input.content.is_empty() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }

    if ScriptRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Script with name '{}' already exists",
            input.name
        ))));
    }

    let metadata = parse_script_metadata(&input.content);
    let checksum = sha256_hex(input.content.as_bytes());

    let scripts_dir = state.config.data_dir.join("scripts");
    tokio::fs::create_dir_all(&scripts_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Cannot create scripts directory: {e}")))?;

    let file_path = scripts_dir.join(format!("{}.sh", input.name));
    tokio::fs::write(&file_path, &input.content)
        .await
        .map_err(|e| AppError::InternalError(format!("Cannot write script file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|e| {
                AppError::InternalError(format!("Cannot make script executable: {e}"))
            })?;
    }

    let script = ScriptRepo::create(
        &state.pool,
        &CreateScript {
            name: input.name,
            description: input.description,
            file_path: file_path.to_string_lossy().into_owned(),
            checksum,
            metadata,
            timeout_secs: input.timeout_secs,
        },
    )
    .await?;

    tracing::info!(script_id = script.id, name = %script.name, "Script registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: script })))
}

/// GET /scripts
///
/// List all registered scripts.
pub async fn list_scripts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Script>>>> {
    let scripts = ScriptRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: scripts }))
}

/// GET /scripts/{id}
///
/// Get a single script by ID.
pub async fn get_script(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Script>>> {
    let script = ScriptRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "script",
                id,
            })
        })?;

    Ok(Json(DataResponse { data: script }))
}

/// DELETE /scripts/{id}
///
/// Remove a script: best-effort file deletion, then the registry record.
/// Existing runs keep their history; a queued run whose script vanishes
/// simply fails at execution time.
pub async fn delete_script(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let script = ScriptRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "script",
                id,
            })
        })?;

    if let Err(e) = tokio::fs::remove_file(&script.file_path).await {
        tracing::warn!(script_id = id, error = %e, "Could not remove script file");
    }

    ScriptRepo::delete(&state.pool, id).await?;

    tracing::info!(script_id = id, name = %script.name, "Script deleted");

    Ok(StatusCode::NO_CONTENT)
}
