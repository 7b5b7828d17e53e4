//! Scenecast Scene Model
//!
//! Defines the declarative input contract for video generation:
//! - **Elements:** Tagged media/annotation units (audio, image, video, subtitles)
//! - **Scenes:** Ordered, time-bounded segments with their own elements
//! - **Config:** The top-level `VideoConfig` with global elements and output spec
//!
//! All timing here is declarative; resolved offsets live in
//! `scenecast-timeline` and are never user-supplied.

pub mod config;
pub mod subtitle;

pub use config::*;
pub use subtitle::*;
