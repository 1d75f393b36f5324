//! Run execution engine.
//!
//! A single-lane executor: submissions from any number of callers are
//! serialized into one FIFO queue and drained by exactly one background
//! worker, so at most one run is in flight at a time. A long run
//! head-of-line-blocks everything behind it, bounded only by each script's
//! configured timeout.
//!
//! The engine owns no durable state. Run records live in the database and
//! are re-read and re-written at every transition; the queue holds only run
//! ids, so a restart loses nothing but the not-yet-executed queue order.

pub mod worker;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use scriptd_core::logs::LogStore;
use scriptd_core::types::DbId;
use scriptd_db::models::status::RunStatus;
use scriptd_db::repositories::RunRepo;
use scriptd_db::DbPool;

use worker::RunOutcome;

/// The run queue plus its single background worker.
///
/// Constructed once by the composition root and shared via `Arc`; there is
/// deliberately no process-wide singleton.
pub struct RunEngine {
    pool: DbPool,
    logs: LogStore,
    tx: mpsc::UnboundedSender<DbId>,
    /// Taken by the first `start()`; `None` afterwards.
    rx: Mutex<Option<mpsc::UnboundedReceiver<DbId>>>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RunEngine {
    /// Create an engine with an empty queue. The worker is not spawned
    /// until [`start`](Self::start) is called.
    pub fn new(pool: DbPool, logs: LogStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            pool,
            logs,
            tx,
            rx: Mutex::new(Some(rx)),
            cancel: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Submit an already-persisted QUEUED run for execution.
    ///
    /// Returns immediately; execution happens on the background worker and
    /// all failure information is discoverable via the run's status and log.
    /// Callers must submit each run at most once: the engine does not
    /// deduplicate, and a double submission means duplicate execution
    /// attempts.
    pub fn enqueue(&self, run_id: DbId) {
        if self.tx.send(run_id).is_err() {
            tracing::error!(run_id, "Run queue is closed; submission dropped");
            return;
        }
        tracing::info!(run_id, "Run enqueued");
    }

    /// Start the background worker. Idempotent: only the first call spawns
    /// a worker; later calls are no-ops.
    ///
    /// Before the worker begins, any run left RUNNING by a previous process
    /// (a crash mid-execution) is reconciled to FAILED, so no run stays
    /// RUNNING forever.
    pub async fn start(&self) {
        let Some(rx) = self.rx.lock().await.take() else {
            tracing::debug!("Run engine already started");
            return;
        };

        match RunRepo::fail_stale_running(&self.pool).await {
            Ok(0) => {}
            Ok(n) => tracing::warn!(count = n, "Reconciled stale RUNNING runs to FAILED"),
            Err(e) => tracing::error!(error = %e, "Stale-run reconciliation failed"),
        }

        let worker = Worker {
            pool: self.pool.clone(),
            logs: self.logs.clone(),
            cancel: self.cancel.clone(),
        };
        *self.handle.lock().await = Some(tokio::spawn(worker.run(rx)));
        tracing::info!("Run engine started");
    }

    /// Signal the worker to exit and wait up to `timeout` for it to finish
    /// the item it is currently processing.
    ///
    /// The in-flight child process is not killed; if it outlives the
    /// timeout the worker task is detached and the next startup's
    /// reconciliation pass marks the orphaned run FAILED.
    pub async fn stop(&self, timeout: Duration) {
        self.cancel.cancel();

        let Some(worker) = self.handle.lock().await.take() else {
            return;
        };

        if tokio::time::timeout(timeout, worker).await.is_err() {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "Run worker did not stop in time; detaching"
            );
        } else {
            tracing::info!("Run engine stopped");
        }
    }
}

/// The single background worker: owns the receiving end of the queue for
/// the lifetime of its task.
struct Worker {
    pool: DbPool,
    logs: LogStore,
    cancel: CancellationToken,
}

impl Worker {
    /// Drain the queue until shutdown is signalled.
    ///
    /// Waiting on the channel and on the cancellation token in one
    /// `select!` means an empty queue just parks the task, and shutdown is
    /// observed promptly even mid-wait.
    async fn run(self, mut rx: mpsc::UnboundedReceiver<DbId>) {
        tracing::info!("Run worker started");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Run worker shutting down");
                    break;
                }
                next = rx.recv() => {
                    match next {
                        Some(run_id) => self.process(run_id).await,
                        None => {
                            tracing::info!("Run queue closed; worker exiting");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Process one queue item. Never panics and never returns an error:
    /// whatever happens to a single run must not take down the loop.
    async fn process(&self, run_id: DbId) {
        match worker::execute_run(&self.pool, &self.logs, run_id).await {
            Ok(RunOutcome::Finished(status)) => {
                tracing::info!(run_id, status = ?status, "Run completed");
            }
            Ok(RunOutcome::RunNotFound) => {
                tracing::error!(run_id, "Run not found; skipping queue item");
            }
            Ok(RunOutcome::NotQueued) => {
                tracing::info!(run_id, "Run no longer queued (canceled); skipping");
            }
            Err(e) => {
                tracing::error!(run_id, error = %e, "Unexpected failure while processing run");
                // Best-effort terminal mark so the run is not left RUNNING;
                // if even this fails the startup reconciliation will catch it.
                if let Err(mark_err) = RunRepo::finish(&self.pool, run_id, RunStatus::Failed).await
                {
                    tracing::error!(run_id, error = %mark_err, "Could not mark run as FAILED");
                }
            }
        }
    }
}
