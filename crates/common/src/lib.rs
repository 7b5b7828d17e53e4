//! Scenecast Common Utilities
//!
//! Shared infrastructure for all Scenecast crates:
//! - Error types and result aliases
//! - Configuration loading
//! - Tracing/logging initialization
//! - Timestamp formatting for subtitle documents

pub mod config;
pub mod error;
pub mod logging;
pub mod timefmt;

pub use config::*;
pub use error::*;
pub use timefmt::*;
