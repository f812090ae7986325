//! Polling scheduler that claims and executes one job per tick.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use serde_json::{json, Value as JsonValue};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use scribe_core::{defaults, Error, JobContext, JobOutcome, Result};
use scribe_db::Database;

use crate::handler::JobResult;
use crate::router::Router;

/// Configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between ticks in milliseconds.
    pub interval_ms: u64,
    /// Overall bound on a single job in seconds.
    pub job_timeout_secs: u64,
    /// Claims older than this are requeued at each tick; disabled when `None`.
    pub claim_lease_secs: Option<u64>,
    /// Whether `start` launches the polling loop.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: defaults::SCHEDULER_INTERVAL_MS,
            job_timeout_secs: defaults::JOB_TIMEOUT_SECS,
            claim_lease_secs: None,
            enabled: true,
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `SCHEDULER_ENABLED` | `true` | Enable/disable the polling loop |
    /// | `SCHEDULER_INTERVAL_MS` | `60000` | Time between ticks |
    /// | `JOB_TIMEOUT_SECS` | `300` | Overall per-job timeout |
    /// | `SCHEDULER_CLAIM_LEASE_SECS` | (unset) | Requeue claims older than this |
    pub fn from_env() -> Self {
        let enabled = std::env::var("SCHEDULER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let interval_ms = std::env::var("SCHEDULER_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::SCHEDULER_INTERVAL_MS)
            .max(1);

        let job_timeout_secs = std::env::var("JOB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::JOB_TIMEOUT_SECS);

        let claim_lease_secs = std::env::var("SCHEDULER_CLAIM_LEASE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&secs| secs > 0);

        Self {
            interval_ms,
            job_timeout_secs,
            claim_lease_secs,
            enabled,
        }
    }

    pub fn with_interval(mut self, ms: u64) -> Self {
        self.interval_ms = ms.max(1);
        self
    }

    pub fn with_job_timeout(mut self, secs: u64) -> Self {
        self.job_timeout_secs = secs;
        self
    }

    pub fn with_claim_lease(mut self, secs: Option<u64>) -> Self {
        self.claim_lease_secs = secs;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Event emitted by the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    JobStarted {
        job_id: Uuid,
        context: JobContext,
    },
    JobCompleted {
        job_id: Uuid,
        context: JobContext,
    },
    JobFailed {
        job_id: Uuid,
        context: JobContext,
        error: String,
    },
    SchedulerStarted,
    SchedulerStopped,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No pending job was available.
    Idle,
    Completed(Uuid),
    Failed(Uuid),
    /// Another tick was still running.
    Skipped,
}

struct Running {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

struct Inner {
    db: Database,
    router: Router,
    config: SchedulerConfig,
    event_tx: broadcast::Sender<SchedulerEvent>,
    tick_lock: Mutex<()>,
    started: AtomicBool,
    running: Mutex<Option<Running>>,
}

/// Fixed-interval scheduler. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(db: Database, router: Router, config: SchedulerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                db,
                router,
                config,
                event_tx,
                tick_lock: Mutex::new(()),
                started: AtomicBool::new(false),
                running: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Get a receiver for scheduler events.
    pub fn events(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Get the pending job count.
    pub async fn pending_count(&self) -> Result<i64> {
        self.inner.db.jobs.pending_count().await
    }

    /// Launch the polling loop.
    ///
    /// Returns `false` without doing anything when the loop is already
    /// running or the scheduler is disabled.
    pub async fn start(&self) -> bool {
        if !self.inner.config.enabled {
            info!(
                subsystem = "jobs",
                component = "scheduler",
                "Scheduler is disabled, not starting"
            );
            return false;
        }
        // Held until the loop is recorded, so shutdown never sees a started
        // loop it cannot stop.
        let mut running = self.inner.running.lock().await;
        if running.is_some() {
            debug!(
                subsystem = "jobs",
                component = "scheduler",
                "Scheduler already running"
            );
            return false;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let scheduler = self.clone();
        let interval = Duration::from_millis(self.inner.config.interval_ms);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(subsystem = "jobs", component = "scheduler", "Scheduler received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = scheduler.tick().await {
                            error!(
                                subsystem = "jobs",
                                component = "scheduler",
                                op = "tick",
                                error = %e,
                                error_kind = e.kind(),
                                "Scheduler tick failed"
                            );
                        }
                    }
                }
            }
        });

        *running = Some(Running { shutdown_tx, task });
        self.inner.started.store(true, Ordering::SeqCst);
        drop(running);

        info!(
            subsystem = "jobs",
            component = "scheduler",
            interval_ms = self.inner.config.interval_ms,
            job_timeout_secs = self.inner.config.job_timeout_secs,
            "Scheduler started"
        );
        let _ = self.inner.event_tx.send(SchedulerEvent::SchedulerStarted);
        true
    }

    /// Stop the polling loop, waiting for an in-flight tick to finish.
    ///
    /// A concurrent `start` waits until the old loop has exited.
    pub async fn shutdown(&self) -> Result<()> {
        let mut guard = self.inner.running.lock().await;
        let Some(running) = guard.take() else {
            return Ok(());
        };
        self.inner.started.store(false, Ordering::SeqCst);

        // The loop may already be gone if its task ended; a closed channel is fine.
        let _ = running.shutdown_tx.send(()).await;
        running
            .task
            .await
            .map_err(|e| Error::Internal(format!("Scheduler task failed: {}", e)))?;
        drop(guard);

        let _ = self.inner.event_tx.send(SchedulerEvent::SchedulerStopped);
        info!(subsystem = "jobs", component = "scheduler", "Scheduler stopped");
        Ok(())
    }

    /// Claim at most one pending job, run it and record its terminal state.
    ///
    /// Errors are limited to ledger failures; anything the job itself does
    /// wrong ends up on the job as `failed`.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let Ok(_guard) = self.inner.tick_lock.try_lock() else {
            debug!(
                subsystem = "jobs",
                component = "scheduler",
                op = "tick",
                "Previous tick still running, skipping"
            );
            return Ok(TickOutcome::Skipped);
        };

        if let Some(lease) = self.inner.config.claim_lease_secs {
            let requeued = self
                .inner
                .db
                .jobs
                .requeue_stale(Duration::from_secs(lease))
                .await?;
            if requeued > 0 {
                warn!(
                    subsystem = "jobs",
                    component = "scheduler",
                    op = "requeue",
                    requeued,
                    lease_secs = lease,
                    "Requeued stale job claims"
                );
            }
        }

        let Some(job) = self.inner.db.jobs.claim_next_pending().await? else {
            debug!(
                subsystem = "jobs",
                component = "scheduler",
                op = "tick",
                "No pending job found"
            );
            return Ok(TickOutcome::Idle);
        };

        let start = Instant::now();
        let job_id = job.id;
        let context = job.context;

        info!(
            subsystem = "jobs",
            component = "scheduler",
            op = "process",
            %job_id,
            %context,
            content_id = %job.content_id,
            "Processing job"
        );
        let _ = self
            .inner
            .event_tx
            .send(SchedulerEvent::JobStarted { job_id, context });

        let result = self.execute(job).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            JobResult::Success(meta) => {
                let transitioned = self
                    .inner
                    .db
                    .jobs
                    .finalize(job_id, JobOutcome::Success(completion_metadata(meta)))
                    .await?;
                if !transitioned {
                    warn!(%job_id, "Job left in_progress before it could be completed");
                }
                info!(
                    subsystem = "jobs",
                    component = "scheduler",
                    op = "process",
                    %job_id,
                    %context,
                    duration_ms,
                    "Job completed successfully"
                );
                let _ = self
                    .inner
                    .event_tx
                    .send(SchedulerEvent::JobCompleted { job_id, context });
                Ok(TickOutcome::Completed(job_id))
            }
            JobResult::Failed(error) => {
                self.record_failure(job_id, context, non_empty(error), false, duration_ms)
                    .await
            }
            JobResult::Fatal(error) => {
                self.record_failure(job_id, context, non_empty(error), true, duration_ms)
                    .await
            }
        }
    }

    /// Run the job through the router under the job timeout, converting
    /// panics and expiry into failures.
    async fn execute(&self, job: scribe_core::Job) -> JobResult {
        let timeout = Duration::from_secs(self.inner.config.job_timeout_secs);
        let work = AssertUnwindSafe(self.inner.router.process(job)).catch_unwind();

        match tokio::time::timeout(timeout, work).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => JobResult::Failed(format!("Job panicked: {}", panic_message(&*panic))),
            Err(_) => JobResult::Failed(format!(
                "Job exceeded timeout of {}s",
                self.inner.config.job_timeout_secs
            )),
        }
    }

    async fn record_failure(
        &self,
        job_id: Uuid,
        context: JobContext,
        error: String,
        infrastructure: bool,
        duration_ms: u64,
    ) -> Result<TickOutcome> {
        self.inner
            .db
            .jobs
            .finalize(job_id, JobOutcome::Failure(error.clone()))
            .await?;

        if infrastructure {
            error!(
                subsystem = "jobs",
                component = "scheduler",
                op = "process",
                %job_id,
                %context,
                error = %error,
                error_kind = "infrastructure",
                duration_ms,
                "Job failed on infrastructure error"
            );
        } else {
            warn!(
                subsystem = "jobs",
                component = "scheduler",
                op = "process",
                %job_id,
                %context,
                error = %error,
                error_kind = "transformation",
                duration_ms,
                "Job failed"
            );
        }

        let _ = self.inner.event_tx.send(SchedulerEvent::JobFailed {
            job_id,
            context,
            error,
        });
        Ok(TickOutcome::Failed(job_id))
    }
}

/// Routine metadata plus the `processed_at` marker.
fn completion_metadata(meta: Option<JsonValue>) -> JsonValue {
    let mut merged = match meta {
        Some(JsonValue::Object(map)) => JsonValue::Object(map),
        Some(JsonValue::Null) | None => json!({}),
        Some(other) => json!({ "result": other }),
    };
    if let Some(map) = merged.as_object_mut() {
        map.insert(
            "processed_at".to_string(),
            JsonValue::String(Utc::now().to_rfc3339()),
        );
    }
    merged
}

fn non_empty(error: String) -> String {
    if error.trim().is_empty() {
        "unknown error".to_string()
    } else {
        error
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_ms, 60_000);
        assert_eq!(config.job_timeout_secs, 300);
        assert!(config.claim_lease_secs.is_none());
        assert!(config.enabled);
    }

    #[test]
    fn test_scheduler_config_builder() {
        let config = SchedulerConfig::default()
            .with_interval(1000)
            .with_job_timeout(5)
            .with_claim_lease(Some(600))
            .with_enabled(false);

        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.job_timeout_secs, 5);
        assert_eq!(config.claim_lease_secs, Some(600));
        assert!(!config.enabled);
    }

    #[test]
    fn test_completion_metadata() {
        let meta = completion_metadata(Some(json!({"artifact_id": "x"})));
        assert_eq!(meta["artifact_id"], "x");
        assert!(meta["processed_at"].is_string());

        let meta = completion_metadata(None);
        assert_eq!(meta.as_object().unwrap().len(), 1);

        let meta = completion_metadata(Some(json!(7)));
        assert_eq!(meta["result"], 7);
    }

    #[test]
    fn test_panic_message() {
        let p: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*p), "boom");
        let p: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*p), "bang");
        let p: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*p), "unknown panic payload");
    }

    #[test]
    fn test_event_clone_and_debug() {
        let job_id = Uuid::new_v4();
        let event = SchedulerEvent::JobFailed {
            job_id,
            context: JobContext::Blog,
            error: "bad".into(),
        };
        let copy = event.clone();
        let debug = format!("{:?}", copy);
        assert!(debug.contains("JobFailed"));
        assert!(debug.contains("Blog"));
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_not_start() {
        let scheduler = Scheduler::new(
            Database::in_memory(),
            Router::new(),
            SchedulerConfig::default().with_enabled(false),
        );
        assert!(!scheduler.start().await);
        assert!(!scheduler.is_running());
        scheduler.shutdown().await.unwrap();
    }
}
