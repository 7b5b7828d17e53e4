//! Transcription result types.
//!
//! Word timestamps are in the audio's local clock: 0.0 is the start of
//! the scene's (concatenated) audio, not the global timeline. The cue
//! builder re-bases them using the resolved scene offsets.

use serde::{Deserialize, Serialize};

/// A single transcribed word with its local time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSpan {
    /// The word text, without surrounding whitespace.
    pub word: String,

    /// Start time in seconds, local to the scene audio.
    pub start_secs: f64,

    /// End time in seconds, local to the scene audio.
    pub end_secs: f64,
}

impl WordSpan {
    pub fn new(word: impl Into<String>, start_secs: f64, end_secs: f64) -> Self {
        Self {
            word: word.into(),
            start_secs,
            end_secs,
        }
    }
}

/// The transcription of one scene's audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTranscript {
    /// Scene this transcript belongs to.
    pub scene_id: String,

    /// Ordered word spans in the audio's local clock.
    pub words: Vec<WordSpan>,
}

impl SceneTranscript {
    /// The full transcript text, words joined by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the transcript carries any usable words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_joins_words() {
        let transcript = SceneTranscript {
            scene_id: "s1".to_string(),
            words: vec![
                WordSpan::new("hello", 0.0, 0.5),
                WordSpan::new("world", 0.5, 1.0),
            ],
        };
        assert_eq!(transcript.text(), "hello world");
        assert!(!transcript.is_empty());
    }
}
