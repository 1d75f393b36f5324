//! Per-run log storage.
//!
//! Each run gets one append-only log file at a location derived solely from
//! its id, so the path can be recomputed after a restart. Reads never fail
//! visibly: callers polling a run's logs get a placeholder or a diagnostic
//! string instead of an error.

use std::path::{Path, PathBuf};

use crate::types::DbId;

/// Returned by [`LogStore::read`] when the run has not produced a log yet.
pub const NO_LOGS_PLACEHOLDER: &str = "No logs available yet.";

/// Fixed filename of the combined stdout/stderr capture within a run's
/// log directory.
const LOG_FILENAME: &str = "logs.txt";

/// Derives and manages per-run log file locations under a base directory.
#[derive(Debug, Clone)]
pub struct LogStore {
    base_dir: PathBuf,
}

impl LogStore {
    /// Create a store rooted at `base_dir` (the configured data directory).
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding all artifacts for one run.
    pub fn run_dir(&self, run_id: DbId) -> PathBuf {
        self.base_dir.join("runs").join(run_id.to_string())
    }

    /// Full path of the run's log file.
    pub fn log_path(&self, run_id: DbId) -> PathBuf {
        self.run_dir(run_id).join(LOG_FILENAME)
    }

    /// Create the run's log directory and an empty log file, returning the
    /// file's path.
    ///
    /// Called by the worker immediately before spawning the child process;
    /// the path is persisted onto the run record so concurrent readers can
    /// tail the log mid-run.
    pub async fn create(&self, run_id: DbId) -> std::io::Result<PathBuf> {
        let dir = self.run_dir(run_id);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(LOG_FILENAME);
        tokio::fs::File::create(&path).await?;
        Ok(path)
    }

    /// Read the full current contents of a run's log as text.
    ///
    /// `log_path` is the path stored on the run record (`None` if execution
    /// has not begun). Missing or unreadable logs degrade to a
    /// human-readable string; this accessor never returns an error.
    pub async fn read(&self, log_path: Option<&Path>) -> String {
        let Some(path) = log_path else {
            return NO_LOGS_PLACEHOLDER.to_string();
        };

        if !path.exists() {
            return NO_LOGS_PLACEHOLDER.to_string();
        }

        match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) => format!("Error reading logs: {e}"),
        }
    }
}
