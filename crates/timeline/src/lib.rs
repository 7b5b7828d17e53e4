//! Scenecast Timeline
//!
//! Turns declarative scene descriptions into a resolved timeline:
//! - **Timing:** Scene start/end offsets from probed element durations
//! - **Transcripts:** Word-level speech-to-text results per scene
//! - **Cues:** Styled subtitle cues re-based onto the global timeline
//! - **ASS:** Advanced SubStation Alpha rendering of a cue track
//!
//! This crate is pure computation — no I/O, no collaborator calls.
//! All inputs are data; all outputs are data.

pub mod ass;
pub mod cues;
pub mod timing;
pub mod transcript;

pub use ass::*;
pub use cues::*;
pub use timing::*;
pub use transcript::*;
