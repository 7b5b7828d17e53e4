//! Error types shared across Scenecast crates.

/// Top-level error type for Scenecast operations.
#[derive(Debug, thiserror::Error)]
pub enum ScenecastError {
    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Scene '{scene_id}' has no audio elements and no explicit duration")]
    AmbiguousDuration { scene_id: String },

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    #[error("Job queue is full (depth {depth})")]
    CapacityExceeded { depth: usize },

    #[error("Unknown job: {job_id}")]
    NotFound { job_id: String },

    #[error("Job {job_id} is already {state} and cannot transition")]
    InvalidTransition { job_id: String, state: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ScenecastError.
pub type ScenecastResult<T> = Result<T, ScenecastError>;

impl ScenecastError {
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn timeout(what: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            secs,
        }
    }
}
