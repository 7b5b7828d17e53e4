//! Word-level speech transcription.

use std::time::Duration;

use async_trait::async_trait;
use scenecast_common::{ScenecastError, ScenecastResult};
use scenecast_timeline::WordSpan;
use serde::Deserialize;

/// Contract for word-level speech-to-text on one audio source.
///
/// Returned spans are in the audio's local clock, ordered by start time.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        src: &str,
        language: &str,
        timeout: Duration,
    ) -> ScenecastResult<Vec<WordSpan>>;
}

/// Transcriber shelling out to a whisper-style CLI.
///
/// The program is invoked as `<program> --language <lang> <src>` and must
/// print a JSON array of word objects to stdout:
///
/// ```json
/// [{"word": "hi", "start": 0.0, "end": 0.4}, ...]
/// ```
#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    program: String,
    extra_args: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireWord {
    word: String,
    start: f64,
    end: f64,
}

impl WhisperCliTranscriber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Append fixed arguments (model path, thread count) to every call.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Check if the transcription CLI is available on the system.
    pub fn is_available(&self) -> bool {
        crate::probe::command_exists(&self.program)
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(
        &self,
        src: &str,
        language: &str,
        timeout: Duration,
    ) -> ScenecastResult<Vec<WordSpan>> {
        tracing::debug!(src, language, "Transcribing audio");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.extra_args)
            .arg("--language")
            .arg(language)
            .arg(src)
            .kill_on_drop(true);

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| {
                ScenecastError::timeout(format!("transcription of {src}"), timeout.as_secs())
            })?
            .map_err(|e| {
                ScenecastError::transcription(format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScenecastError::transcription(format!(
                "{} exited with {} for {src}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let words = parse_word_json(&output.stdout)?;
        tracing::debug!(src, words = words.len(), "Transcription finished");
        Ok(words)
    }
}

/// Parse the CLI's word-array JSON, dropping empty words and keeping
/// the original order.
fn parse_word_json(stdout: &[u8]) -> ScenecastResult<Vec<WordSpan>> {
    let wire: Vec<WireWord> = serde_json::from_slice(stdout)
        .map_err(|e| ScenecastError::transcription(format!("unparseable word JSON: {e}")))?;

    Ok(wire
        .into_iter()
        .filter(|w| !w.word.trim().is_empty())
        .map(|w| WordSpan::new(w.word.trim(), w.start, w.end))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_json() {
        let stdout = br#"[
            {"word": " hi", "start": 0.0, "end": 0.4},
            {"word": "there ", "start": 0.4, "end": 0.9},
            {"word": "  ", "start": 0.9, "end": 1.0}
        ]"#;
        let words = parse_word_json(stdout).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "hi");
        assert_eq!(words[1].word, "there");
        assert!((words[1].start_secs - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_word_json(b"whisper crashed").is_err());
    }
}
