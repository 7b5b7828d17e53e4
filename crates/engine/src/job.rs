//! Job lifecycle types.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use scenecast_scene_model::VideoConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique job identifier.
pub type JobId = Uuid;

/// Job lifecycle state.
///
/// Transitions: `pending → processing → {completed, failed, cancelled}`,
/// plus `pending → cancelled` when a job is cancelled before dispatch.
/// The three right-hand states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Whether no further transitions can leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    /// Wire-format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One video-generation job, owned by the scheduler's registry.
///
/// Mutated only by the worker executing it; readers get a `JobSnapshot`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub config: Arc<VideoConfig>,
    pub state: JobState,
    pub progress: u8,
    pub current_step: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub output: Option<PathBuf>,
}

impl Job {
    /// Create a freshly queued job.
    pub fn new(config: VideoConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config: Arc::new(config),
            state: JobState::Pending,
            progress: 0,
            current_step: "Queued".to_string(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
            output: None,
        }
    }

    /// Wall-clock processing duration, once the job has both endpoints.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }

    /// A point-in-time copy for readers. Never exposes the config.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id,
            status: self.state,
            progress: self.progress,
            current_step: self.current_step.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            error: self.error.clone(),
            output: self.output.clone(),
            duration_secs: self.duration_secs(),
        }
    }
}

/// Point-in-time copy of a job's caller-visible fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: JobState,
    pub progress: u8,
    pub current_step: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub output: Option<PathBuf>,
    pub duration_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::minimal_config;

    #[test]
    fn test_new_job_is_pending_at_zero() {
        let job = Job::new(minimal_config());
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.progress, 0);
        assert_eq!(job.current_step, "Queued");
        assert!(job.started_at.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Processing.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }

    #[test]
    fn test_duration_requires_both_endpoints() {
        let mut job = Job::new(minimal_config());
        assert_eq!(job.duration_secs(), None);

        job.started_at = Some(Utc::now());
        assert_eq!(job.duration_secs(), None);

        job.completed_at = Some(job.started_at.unwrap() + chrono::Duration::milliseconds(2500));
        assert!((job.duration_secs().unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_reflects_job() {
        let mut job = Job::new(minimal_config());
        job.progress = 60;
        job.current_step = "Render plan ready".to_string();

        let snapshot = job.snapshot();
        assert_eq!(snapshot.job_id, job.id);
        assert_eq!(snapshot.status, JobState::Pending);
        assert_eq!(snapshot.progress, 60);
        assert_eq!(snapshot.current_step, "Render plan ready");
    }

    #[test]
    fn test_snapshot_serializes_lowercase_status() {
        let job = Job::new(minimal_config());
        let json = serde_json::to_value(job.snapshot()).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["progress"], 0);
    }
}
