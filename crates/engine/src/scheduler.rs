//! Job scheduling.
//!
//! The scheduler owns the process-scoped job registry and a bounded
//! worker pool. Submissions enqueue onto a FIFO channel sized by the
//! configured queue depth; a full queue rejects the submit. Exactly one
//! worker ever executes a given job — an id leaves the queue before
//! dispatch, so two workers can never hold the same job.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use scenecast_common::{ScenecastError, ScenecastResult, SchedulerConfig};
use scenecast_scene_model::VideoConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cancel::CancelToken;
use crate::job::{Job, JobId, JobSnapshot, JobState};
use crate::runner::{PipelineContext, PipelineEnd, PipelineRunner, ProgressObserver};

/// Registry slot: the job plus its cancellation token.
struct JobEntry {
    job: Job,
    cancel: CancelToken,
}

struct Inner {
    config: SchedulerConfig,
    ctx: Arc<PipelineContext>,
    registry: RwLock<HashMap<JobId, JobEntry>>,
}

/// The asynchronous job scheduler.
pub struct JobScheduler {
    inner: Arc<Inner>,
    queue_tx: mpsc::Sender<JobId>,
    workers: Vec<JoinHandle<()>>,
}

/// Per-state job counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StateCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Point-in-time scheduler statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub total_jobs: usize,
    pub counts: StateCounts,
    /// Mean wall-clock duration of completed jobs, rounded to 0.1s.
    pub average_duration_secs: f64,
    pub active_workers: usize,
    pub max_workers: usize,
}

impl JobScheduler {
    /// Start the scheduler: creates the registry and spawns the worker
    /// pool. The registry lives until `shutdown`.
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        let config = ctx.config.scheduler;
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_depth.max(1));
        let queue_rx = Arc::new(tokio::sync::Mutex::new(queue_rx));

        let inner = Arc::new(Inner {
            config,
            ctx,
            registry: RwLock::new(HashMap::new()),
        });

        let worker_count = config.workers.max(1);
        let workers = (0..worker_count)
            .map(|worker_id| {
                let inner = Arc::clone(&inner);
                let queue_rx = Arc::clone(&queue_rx);
                tokio::spawn(worker_loop(worker_id, inner, queue_rx))
            })
            .collect();

        tracing::info!(workers = worker_count, queue_depth = config.queue_depth, "Scheduler started");

        Self {
            inner,
            queue_tx,
            workers,
        }
    }

    /// Queue a pre-validated config as a new job.
    ///
    /// Returns immediately with the job id, or `CapacityExceeded` when
    /// the queue is full. A rejected submission leaves no trace in the
    /// registry.
    pub fn submit(&self, config: VideoConfig) -> ScenecastResult<JobId> {
        let job = Job::new(config);
        let job_id = job.id;

        {
            let mut registry = self.inner.registry.write().expect("job registry poisoned");
            registry.insert(
                job_id,
                JobEntry {
                    job,
                    cancel: CancelToken::new(),
                },
            );
        }

        match self.queue_tx.try_send(job_id) {
            Ok(()) => {
                tracing::info!(job_id = %job_id, "Job submitted");
                Ok(job_id)
            }
            Err(_) => {
                self.inner
                    .registry
                    .write()
                    .expect("job registry poisoned")
                    .remove(&job_id);
                Err(ScenecastError::CapacityExceeded {
                    depth: self.inner.config.queue_depth,
                })
            }
        }
    }

    /// Point-in-time snapshot of a job.
    pub fn status(&self, job_id: JobId) -> ScenecastResult<JobSnapshot> {
        let registry = self.inner.registry.read().expect("job registry poisoned");
        registry
            .get(&job_id)
            .map(|entry| entry.job.snapshot())
            .ok_or_else(|| ScenecastError::NotFound {
                job_id: job_id.to_string(),
            })
    }

    /// Snapshots of known jobs, most recently created first. `limit` is
    /// clamped to the configured maximum.
    pub fn list(&self, state: Option<JobState>, limit: usize) -> Vec<JobSnapshot> {
        let limit = limit.min(self.inner.config.list_limit_max);
        let registry = self.inner.registry.read().expect("job registry poisoned");

        let mut snapshots: Vec<JobSnapshot> = registry
            .values()
            .filter(|entry| state.map_or(true, |s| entry.job.state == s))
            .map(|entry| entry.job.snapshot())
            .collect();
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        snapshots.truncate(limit);
        snapshots
    }

    /// Cancel a job.
    ///
    /// Pending jobs become `cancelled` immediately. Processing jobs are
    /// signalled and this returns optimistically; the state flips once
    /// the runner observes the signal at its next checkpoint. Terminal
    /// jobs reject the call.
    pub fn cancel(&self, job_id: JobId) -> ScenecastResult<()> {
        let mut registry = self.inner.registry.write().expect("job registry poisoned");
        let entry = registry
            .get_mut(&job_id)
            .ok_or_else(|| ScenecastError::NotFound {
                job_id: job_id.to_string(),
            })?;

        match entry.job.state {
            JobState::Pending => {
                entry.job.state = JobState::Cancelled;
                entry.job.current_step = "Cancelled".to_string();
                entry.job.completed_at = Some(Utc::now());
                tracing::info!(job_id = %job_id, "Pending job cancelled");
                Ok(())
            }
            JobState::Processing => {
                entry.cancel.cancel();
                tracing::info!(job_id = %job_id, "Cancellation signalled to running job");
                Ok(())
            }
            terminal => Err(ScenecastError::InvalidTransition {
                job_id: job_id.to_string(),
                state: terminal.to_string(),
            }),
        }
    }

    /// Aggregate statistics over the registry.
    pub fn stats(&self) -> SchedulerStats {
        let registry = self.inner.registry.read().expect("job registry poisoned");

        let mut counts = StateCounts::default();
        let mut completed_durations = Vec::new();
        for entry in registry.values() {
            match entry.job.state {
                JobState::Pending => counts.pending += 1,
                JobState::Processing => counts.processing += 1,
                JobState::Completed => {
                    counts.completed += 1;
                    if let Some(secs) = entry.job.duration_secs() {
                        completed_durations.push(secs);
                    }
                }
                JobState::Failed => counts.failed += 1,
                JobState::Cancelled => counts.cancelled += 1,
            }
        }

        let average_duration_secs = if completed_durations.is_empty() {
            0.0
        } else {
            let mean: f64 =
                completed_durations.iter().sum::<f64>() / completed_durations.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        SchedulerStats {
            total_jobs: registry.len(),
            counts,
            average_duration_secs,
            active_workers: counts.processing,
            max_workers: self.inner.config.workers.max(1),
        }
    }

    /// Stop accepting work, let in-flight jobs finish, and clear the
    /// registry.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down scheduler");
        drop(self.queue_tx);
        for handle in self.workers {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Worker join failed");
            }
        }
        self.inner
            .registry
            .write()
            .expect("job registry poisoned")
            .clear();
        tracing::info!("Scheduler shutdown complete");
    }
}

/// One worker: pull ids FIFO, run the pipeline, record the outcome.
async fn worker_loop(
    worker_id: usize,
    inner: Arc<Inner>,
    queue_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<JobId>>>,
) {
    loop {
        let job_id = {
            let mut rx = queue_rx.lock().await;
            match rx.recv().await {
                Some(id) => id,
                None => break,
            }
        };
        process_job(worker_id, &inner, job_id).await;
    }
    tracing::debug!(worker_id, "Worker exiting");
}

async fn process_job(worker_id: usize, inner: &Arc<Inner>, job_id: JobId) {
    let (config, cancel) = {
        let mut registry = inner.registry.write().expect("job registry poisoned");
        let Some(entry) = registry.get_mut(&job_id) else {
            tracing::warn!(job_id = %job_id, "Dequeued job missing from registry");
            return;
        };
        if entry.job.state != JobState::Pending {
            // cancelled while queued; nothing ran, nothing to do
            tracing::info!(job_id = %job_id, state = %entry.job.state, "Skipping dequeued job");
            return;
        }
        entry.job.state = JobState::Processing;
        if entry.job.started_at.is_none() {
            entry.job.started_at = Some(Utc::now());
        }
        entry.job.current_step = "Starting video generation".to_string();
        (Arc::clone(&entry.job.config), entry.cancel.clone())
    };

    tracing::info!(worker_id, job_id = %job_id, "Job dispatched");

    let runner = PipelineRunner::new(Arc::clone(&inner.ctx));
    let progress = RegistryProgress {
        inner: Arc::clone(inner),
        job_id,
    };

    match runner.run(job_id, &config, &cancel, &progress).await {
        Ok(PipelineEnd::Completed { output, .. }) => complete_job(inner, job_id, output),
        Ok(PipelineEnd::Cancelled) => cancel_job(inner, job_id),
        Err(e) => fail_job(inner, job_id, e.to_string()),
    }
}

/// Progress observer writing milestone updates back into the registry.
struct RegistryProgress {
    inner: Arc<Inner>,
    job_id: JobId,
}

impl ProgressObserver for RegistryProgress {
    fn update(&self, progress: u8, step: &str) {
        let mut registry = self.inner.registry.write().expect("job registry poisoned");
        if let Some(entry) = registry.get_mut(&self.job_id) {
            if entry.job.state == JobState::Processing {
                entry.job.progress = progress.min(100);
                entry.job.current_step = step.to_string();
            }
        }
    }
}

fn complete_job(inner: &Inner, job_id: JobId, output: PathBuf) {
    let mut registry = inner.registry.write().expect("job registry poisoned");
    if let Some(entry) = registry.get_mut(&job_id) {
        entry.job.state = JobState::Completed;
        entry.job.progress = 100;
        entry.job.current_step = "Completed".to_string();
        entry.job.completed_at = Some(Utc::now());
        entry.job.output = Some(output);
        match entry.job.duration_secs() {
            Some(secs) => {
                tracing::info!(job_id = %job_id, duration_secs = secs, "Job completed")
            }
            None => tracing::info!(job_id = %job_id, "Job completed"),
        }
    }
}

fn cancel_job(inner: &Inner, job_id: JobId) {
    let mut registry = inner.registry.write().expect("job registry poisoned");
    if let Some(entry) = registry.get_mut(&job_id) {
        entry.job.state = JobState::Cancelled;
        entry.job.current_step = "Cancelled".to_string();
        entry.job.completed_at = Some(Utc::now());
        tracing::info!(job_id = %job_id, "Job cancelled");
    }
}

fn fail_job(inner: &Inner, job_id: JobId, error: String) {
    let mut registry = inner.registry.write().expect("job registry poisoned");
    if let Some(entry) = registry.get_mut(&job_id) {
        entry.job.state = JobState::Failed;
        entry.job.current_step = "Failed".to_string();
        entry.job.error = Some(error.clone());
        entry.job.completed_at = Some(Utc::now());
        tracing::error!(job_id = %job_id, error = %error, "Job failed");
    }
}
