//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where finished videos are written.
    pub output_dir: PathBuf,

    /// Job scheduling limits.
    pub scheduler: SchedulerConfig,

    /// Duration probing limits.
    pub probe: ProbeConfig,

    /// Transcription limits.
    pub transcription: TranscriptionConfig,

    /// External encoder settings.
    pub encoder: EncoderConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Worker pool and queue limits for the job scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of jobs processed concurrently.
    pub workers: usize,

    /// Maximum number of pending jobs held before submit is rejected.
    pub queue_depth: usize,

    /// Hard cap applied to the `limit` argument of job listings.
    pub list_limit_max: usize,
}

/// Limits for the duration-probe stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum in-flight probes within a single job.
    pub concurrency: usize,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,
}

/// Limits for the transcription stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whether subtitle transcription runs at all.
    pub enabled: bool,

    /// Maximum in-flight transcriptions within a single job.
    pub concurrency: usize,

    /// Per-transcription timeout in seconds.
    pub timeout_secs: u64,

    /// Speech-to-text CLI invoked per scene audio.
    pub program: String,
}

/// Settings passed through to the external encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Encode timeout in seconds.
    pub timeout_secs: u64,

    /// x264 constant rate factor.
    pub crf: u32,

    /// x264 preset name.
    pub preset: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "scenecast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./generated_videos"),
            scheduler: SchedulerConfig::default(),
            probe: ProbeConfig::default(),
            transcription: TranscriptionConfig::default(),
            encoder: EncoderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_depth: 32,
            list_limit_max: 100,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout_secs: 30,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: 5,
            timeout_secs: 300,
            program: "whisper-cli".to_string(),
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            crf: 23,
            preset: "fast".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("scenecast").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scheduler.workers, 2);
        assert_eq!(config.scheduler.queue_depth, 32);
        assert_eq!(config.probe.concurrency, 10);
        assert_eq!(config.transcription.timeout_secs, 300);
        assert!(config.transcription.enabled);
        assert_eq!(config.encoder.preset, "fast");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"scheduler": {"workers": 8}}"#).unwrap();
        assert_eq!(config.scheduler.workers, 8);
        assert_eq!(config.scheduler.queue_depth, 32);
        assert_eq!(config.encoder.crf, 23);
    }
}
