//! Scenecast Media Collaborators
//!
//! Contracts for the external calls the pipeline suspends on, plus the
//! default subprocess-backed implementations:
//! - **Probing:** media duration lookup (`ffprobe`)
//! - **Transcription:** word-level speech-to-text (whisper-style CLI)
//!
//! The engine depends only on the traits here; tests substitute mocks.

pub mod probe;
pub mod transcribe;

pub use probe::*;
pub use transcribe::*;
