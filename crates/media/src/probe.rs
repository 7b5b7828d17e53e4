//! Media duration probing.

use std::time::Duration;

use async_trait::async_trait;
use scenecast_common::{ScenecastError, ScenecastResult};

/// Contract for duration lookup on a media source.
#[async_trait]
pub trait DurationProber: Send + Sync {
    /// Return the source duration in seconds.
    async fn probe(&self, src: &str, timeout: Duration) -> ScenecastResult<f64>;
}

/// `ffprobe`-backed duration prober.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProber {
    program: String,
}

impl FfprobeDurationProber {
    pub fn new() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }

    /// Use a non-default ffprobe binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if ffprobe is available on the system.
    pub fn is_available(&self) -> bool {
        command_exists(&self.program)
    }
}

impl Default for FfprobeDurationProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurationProber for FfprobeDurationProber {
    async fn probe(&self, src: &str, timeout: Duration) -> ScenecastResult<f64> {
        tracing::debug!(src, "Probing media duration");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(src)
            .kill_on_drop(true);

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| ScenecastError::timeout(format!("duration probe of {src}"), timeout.as_secs()))?
            .map_err(|e| ScenecastError::probe(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(ScenecastError::probe(format!(
                "{} exited with {} for {src}",
                self.program, output.status
            )));
        }

        parse_ffprobe_duration(&output.stdout)
            .ok_or_else(|| ScenecastError::probe(format!("no duration in ffprobe output for {src}")))
    }
}

/// Extract `format.duration` from ffprobe's JSON output.
fn parse_ffprobe_duration(stdout: &[u8]) -> Option<f64> {
    let value: serde_json::Value = serde_json::from_slice(stdout).ok()?;
    value
        .get("format")?
        .get("duration")?
        .as_str()?
        .parse::<f64>()
        .ok()
}

pub(crate) fn command_exists(binary: &str) -> bool {
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
    fn test_parse_ffprobe_duration() {
        let stdout = br#"{"format": {"filename": "a.mp3", "duration": "12.250000"}}"#;
        let duration = parse_ffprobe_duration(stdout).unwrap();
        assert!((duration - 12.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_missing_duration() {
        assert!(parse_ffprobe_duration(br#"{"format": {}}"#).is_none());
        assert!(parse_ffprobe_duration(b"not json").is_none());
        assert!(parse_ffprobe_duration(b"{}").is_none());
    }
}
