//! Scenecast Render
//!
//! Turns a validated config plus resolved timing and cues into the
//! artifact handed to the external encoder:
//!
//! ```text
//! VideoConfig ──┐
//!               ├── build_render_plan ──► RenderPlan ──► ffmpeg_args
//! ResolvedTiming┘                             │               │
//! SubtitleCues ───────────────────────────────┘               ▼
//!                                                    EncodeBackend (ffmpeg)
//!                                                             │
//!                                                             ▼
//!                                                        output.mp4
//! ```
//!
//! Plan building is a pure function; all process execution lives behind
//! the `EncodeBackend` trait.

pub mod encode;
pub mod ffmpeg;
pub mod plan;

pub use encode::*;
pub use ffmpeg::*;
pub use plan::*;
