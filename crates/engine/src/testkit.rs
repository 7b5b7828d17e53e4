//! Shared mocks and fixtures for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scenecast_common::{AppConfig, ScenecastError, ScenecastResult};
use scenecast_media::{DurationProber, Transcriber};
use scenecast_render::EncodeBackend;
use scenecast_scene_model::{
    AudioElement, Element, Scene, SubtitleElement, SubtitleSettings, VideoConfig,
};
use scenecast_timeline::WordSpan;

use crate::runner::{PipelineContext, ProgressObserver};

/// Two scenes backed by `a.mp3` (5.0s) and `b.mp3` (7.25s), no globals.
pub(crate) fn minimal_config() -> VideoConfig {
    VideoConfig {
        comment: None,
        resolution: "custom".to_string(),
        quality: Default::default(),
        width: 1080,
        height: 1920,
        scenes: vec![
            Scene {
                id: "one".to_string(),
                background_color: "transparent".to_string(),
                duration: None,
                elements: vec![Element::Audio(AudioElement {
                    src: "a.mp3".to_string(),
                })],
            },
            Scene {
                id: "two".to_string(),
                background_color: "transparent".to_string(),
                duration: None,
                elements: vec![Element::Audio(AudioElement {
                    src: "b.mp3".to_string(),
                })],
            },
        ],
        elements: vec![],
    }
}

/// `minimal_config` plus an enabled progressive subtitle element.
pub(crate) fn config_with_subtitles() -> VideoConfig {
    let mut config = minimal_config();
    config.elements.push(Element::Subtitles(SubtitleElement {
        id: None,
        settings: SubtitleSettings::default(),
        language: "en".to_string(),
    }));
    config
}

pub(crate) fn test_context(
    prober: MockProber,
    transcriber: MockTranscriber,
    encoder: MockEncoder,
) -> Arc<PipelineContext> {
    let mut config = AppConfig::default();
    config.output_dir = std::env::temp_dir().join("scenecast-tests");
    Arc::new(PipelineContext {
        config,
        prober: Arc::new(prober),
        transcriber: Arc::new(transcriber),
        encoder: Arc::new(encoder),
    })
}

/// Progress observer that records every milestone value.
pub(crate) struct RecordingProgress(Arc<Mutex<Vec<u8>>>);

impl ProgressObserver for RecordingProgress {
    fn update(&self, progress: u8, _step: &str) {
        self.0.lock().unwrap().push(progress);
    }
}

pub(crate) fn recording_progress() -> (RecordingProgress, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    (RecordingProgress(Arc::clone(&seen)), seen)
}

/// Prober returning scripted durations.
pub(crate) struct MockProber {
    durations: HashMap<String, f64>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockProber {
    pub(crate) fn with_durations(entries: &[(&str, f64)]) -> Self {
        Self {
            durations: entries
                .iter()
                .map(|(src, d)| (src.to_string(), *d))
                .collect(),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle on the number of probe calls made.
    pub(crate) fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl DurationProber for MockProber {
    async fn probe(&self, src: &str, _timeout: Duration) -> ScenecastResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.durations
            .get(src)
            .copied()
            .ok_or_else(|| ScenecastError::probe(format!("unknown source {src}")))
    }
}

/// Transcriber returning the same scripted words for every scene, or a
/// scripted failure.
pub(crate) struct MockTranscriber {
    words: Vec<WordSpan>,
    fail: Option<fn(&str) -> ScenecastError>,
}

impl MockTranscriber {
    pub(crate) fn empty() -> Self {
        Self {
            words: Vec::new(),
            fail: None,
        }
    }

    pub(crate) fn with_words(entries: &[(&str, f64, f64)]) -> Self {
        Self {
            words: entries
                .iter()
                .map(|(w, s, e)| WordSpan::new(*w, *s, *e))
                .collect(),
            fail: None,
        }
    }

    pub(crate) fn timing_out() -> Self {
        Self {
            words: Vec::new(),
            fail: Some(|src| ScenecastError::timeout(format!("transcription of {src}"), 300)),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        src: &str,
        _language: &str,
        _timeout: Duration,
    ) -> ScenecastResult<Vec<WordSpan>> {
        if let Some(fail) = self.fail {
            return Err(fail(src));
        }
        Ok(self.words.clone())
    }
}

/// Encoder recording every argument vector it receives.
pub(crate) struct MockEncoder {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl MockEncoder {
    pub(crate) fn ok() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            delay: None,
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::ok()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle on the recorded argument vectors.
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl EncodeBackend for MockEncoder {
    async fn encode(&self, args: &[String], _timeout: Duration) -> ScenecastResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(args.to_vec());
        match &self.fail_with {
            Some(message) => Err(ScenecastError::encode(message.clone())),
            None => Ok(()),
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}
