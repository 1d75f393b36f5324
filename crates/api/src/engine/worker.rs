//! Per-run execution: the state machine driven for each dequeued run id.
//!
//! Stage order is load-bearing: the RUNNING transition happens before the
//! script lookup, and the log path is persisted before the child is
//! spawned so a log-tailing reader can observe it mid-run.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use scriptd_core::env::allowlisted_overlay;
use scriptd_core::logs::LogStore;
use scriptd_core::types::DbId;
use scriptd_db::models::script::Script;
use scriptd_db::models::status::RunStatus;
use scriptd_db::repositories::{RunRepo, ScriptRepo};
use scriptd_db::DbPool;

/// What became of one dequeued queue item.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run reached a terminal status.
    Finished(RunStatus),
    /// The run record does not exist; nothing to mark.
    RunNotFound,
    /// The run had already left QUEUED (canceled while waiting); skipped.
    NotQueued,
}

/// Failures while launching or supervising the child process. These fail
/// the run and land in its log as diagnostic text; they are never
/// propagated to a caller because submission is fire-and-forget.
#[derive(Debug, thiserror::Error)]
enum ExecError {
    #[error("{0}")]
    Spawn(std::io::Error),
    #[error("{0}")]
    Wait(std::io::Error),
    #[error("run exceeded timeout of {limit_secs}s and was killed")]
    Timeout { limit_secs: u64 },
}

/// Drive a single run to a terminal status.
///
/// Only database errors bubble up (the caller treats them as the
/// "unexpected" class and does a best-effort FAILED mark); every
/// execution-level failure is absorbed into the run's own record and log.
pub async fn execute_run(
    pool: &DbPool,
    logs: &LogStore,
    run_id: DbId,
) -> Result<RunOutcome, sqlx::Error> {
    let Some(run) = RunRepo::find_by_id(pool, run_id).await? else {
        return Ok(RunOutcome::RunNotFound);
    };

    // QUEUED -> RUNNING. A guard miss means the run was canceled while
    // waiting in the queue; it must not execute.
    if !RunRepo::mark_running(pool, run_id).await? {
        return Ok(RunOutcome::NotQueued);
    }

    let Some(script) = ScriptRepo::find_by_id(pool, run.target_id).await? else {
        tracing::error!(run_id, script_id = run.target_id, "Script not found for run");
        RunRepo::finish(pool, run_id, RunStatus::Failed).await?;
        return Ok(RunOutcome::Finished(RunStatus::Failed));
    };

    // Log sink before spawn: the path must be on the record before any
    // output exists so concurrent readers can tail it.
    let log_path = match logs.create(run_id).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(run_id, error = %e, "Failed to prepare log sink");
            RunRepo::finish(pool, run_id, RunStatus::Failed).await?;
            return Ok(RunOutcome::Finished(RunStatus::Failed));
        }
    };
    RunRepo::set_log_path(pool, run_id, &log_path.to_string_lossy()).await?;

    let overlay = allowlisted_overlay(run.params.as_ref().unwrap_or(&serde_json::Value::Null));

    tracing::info!(run_id, script = %script.name, path = %script.file_path, "Executing run");

    let status = match supervise(&script, &overlay, &log_path).await {
        Ok(exit) => {
            let code = exit.code();
            if exit.success() {
                RunStatus::Success
            } else {
                tracing::info!(run_id, exit_code = code, "Run exited non-zero");
                RunStatus::Failed
            }
        }
        Err(e) => {
            tracing::error!(run_id, error = %e, "Run execution failed");
            append_diagnostic(&log_path, &e).await;
            RunStatus::Failed
        }
    };

    RunRepo::finish(pool, run_id, status).await?;
    Ok(RunOutcome::Finished(status))
}

/// Spawn the script as a child process and wait for it to exit, bounded by
/// the script's configured timeout.
///
/// The child gets its own process group so the whole subtree can be killed
/// as a unit on timeout. Stdout and stderr share the log file; ordering
/// across the two streams is whatever the kernel interleaves.
async fn supervise(
    script: &Script,
    env_overlay: &[(String, String)],
    log_path: &Path,
) -> Result<std::process::ExitStatus, ExecError> {
    let stdout_log = std::fs::OpenOptions::new()
        .append(true)
        .open(log_path)
        .map_err(ExecError::Spawn)?;
    let stderr_log = stdout_log.try_clone().map_err(ExecError::Spawn)?;

    let mut cmd = Command::new(&script.file_path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log))
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    // Inherited environment plus the allow-listed parameter overlay; the
    // overlay can never introduce keys outside the allow-list.
    for (key, value) in env_overlay {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(ExecError::Spawn)?;

    let limit_secs = script.timeout_secs.max(1) as u64;
    match tokio::time::timeout(Duration::from_secs(limit_secs), child.wait()).await {
        Ok(Ok(exit)) => Ok(exit),
        Ok(Err(e)) => Err(ExecError::Wait(e)),
        Err(_elapsed) => {
            terminate(&mut child).await;
            Err(ExecError::Timeout { limit_secs })
        }
    }
}

/// Kill the child's entire process group, then reap the child itself.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The child is its own process group leader (process_group(0)),
        // so its pid doubles as the pgid.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "Failed to kill timed-out child");
    }
}

/// Append execution-error text to the run's log so operators can diagnose
/// failures without separate tooling. Best-effort: if the log itself is
/// unwritable there is nowhere left to report.
async fn append_diagnostic(log_path: &Path, err: &ExecError) {
    use tokio::io::AsyncWriteExt;

    let text = format!("\nExecution error: {err}\n");
    let file = tokio::fs::OpenOptions::new()
        .append(true)
        .open(log_path)
        .await;

    match file {
        Ok(mut f) => {
            if let Err(e) = f.write_all(text.as_bytes()).await {
                tracing::warn!(error = %e, "Could not append diagnostic to run log");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not open run log for diagnostic"),
    }
}
