//! External encoder integration.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use scenecast_common::{ScenecastError, ScenecastResult};

/// Trait for encode backends (ffmpeg today, GStreamer-style pipelines
/// possible later).
#[async_trait]
pub trait EncodeBackend: Send + Sync {
    /// Run the encoder with a fully serialized argument vector.
    ///
    /// The final argument is the output path; on success that file
    /// exists and is complete.
    async fn encode(&self, args: &[String], timeout: Duration) -> ScenecastResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// ffmpeg subprocess backend.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// First line of `ffmpeg -version`, if the binary runs.
    pub fn version(&self) -> Option<String> {
        let output = std::process::Command::new(&self.program)
            .arg("-version")
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8(output.stdout).ok()?;
        stdout.lines().next().map(|s| s.to_string())
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EncodeBackend for FfmpegEncoder {
    async fn encode(&self, args: &[String], timeout: Duration) -> ScenecastResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args).kill_on_drop(true);

        let started = std::time::Instant::now();
        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| ScenecastError::timeout("ffmpeg encode", timeout.as_secs()))?
            .map_err(|e| ScenecastError::encode(format!("failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScenecastError::encode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                tail(stderr.trim(), 2000)
            )));
        }

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "ffmpeg encode finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists(&self.program)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Where the output file for a job lands.
pub fn output_path(output_dir: &std::path::Path, job_id: &str) -> PathBuf {
    output_dir.join(format!("{job_id}.mp4"))
}

/// Last `max` bytes of a diagnostic string, on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

fn command_exists(binary: &str) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = output_path(std::path::Path::new("/videos"), "abc-123");
        assert_eq!(path, PathBuf::from("/videos/abc-123.mp4"));
    }

    #[test]
    fn test_tail_keeps_short_strings() {
        assert_eq!(tail("short", 100), "short");
    }

    #[test]
    fn test_tail_truncates_on_char_boundary() {
        let s = "ααααα"; // two bytes per char
        let t = tail(s, 3);
        assert_eq!(t, "α");
    }
}
