//! Pipeline execution for a single job.
//!
//! Stages run strictly in sequence with a cancellation checkpoint
//! between each, publishing the progress milestones below. A stage
//! failure terminates the job; nothing is retried here.
//!
//! | stage            | progress | step                    |
//! |------------------|----------|-------------------------|
//! | probe start      | 10       | Analyzing audio         |
//! | probe done       | 20       | Audio analysis complete |
//! | transcribe done  | 30       | Transcription complete  |
//! | cues built       | 50       | Subtitles generated     |
//! | plan built       | 60       | Render plan ready       |
//! | encode start     | 70       | Encoding video          |
//! | encode done      | 95       | Encoding complete       |
//! | finalize         | 100      | Completed               |
//!
//! With subtitles disabled the transcribe/cue rows are skipped and
//! progress jumps from 20 to 60.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scenecast_common::{AppConfig, ScenecastError};
use scenecast_media::{DurationProber, Transcriber};
use scenecast_render::{build_render_plan, ffmpeg_args, output_path, EncodeBackend, RenderPlan};
use scenecast_scene_model::VideoConfig;
use scenecast_timeline::{
    build_cues, render_ass, resolve_timing, SceneTranscript, SourceDurations, SubtitleCue,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cancel::CancelToken;
use crate::job::JobId;

/// Collaborators and limits shared by every pipeline run.
pub struct PipelineContext {
    pub config: AppConfig,
    pub prober: Arc<dyn DurationProber>,
    pub transcriber: Arc<dyn Transcriber>,
    pub encoder: Arc<dyn EncodeBackend>,
}

/// Observer for progress milestone updates.
pub trait ProgressObserver: Send + Sync {
    fn update(&self, progress: u8, step: &str);
}

/// The fallible pipeline stages, named as they appear in user-visible
/// errors. Cue and plan building are pure and cannot fail on their own;
/// their inputs are checked in the stages below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probe,
    Transcribe,
    Encode,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Probe => "audio analysis",
            Stage::Transcribe => "transcription",
            Stage::Encode => "encoding",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage failure with the stage recorded for the job's error string.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: ScenecastError,
}

/// How a pipeline run ended, short of failing.
#[derive(Debug)]
pub enum PipelineEnd {
    /// All stages ran; the output file reference is final.
    Completed { output: PathBuf, plan: RenderPlan },
    /// A checkpoint observed the cancellation signal.
    Cancelled,
}

/// Executes the stage sequence for one job.
pub struct PipelineRunner {
    ctx: Arc<PipelineContext>,
}

impl PipelineRunner {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self { ctx }
    }

    /// Run every stage for `job_id`, honoring `cancel` at each
    /// checkpoint and reporting milestones through `progress`.
    pub async fn run(
        &self,
        job_id: JobId,
        config: &VideoConfig,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<PipelineEnd, StageError> {
        macro_rules! checkpoint {
            () => {
                if cancel.is_cancelled() {
                    tracing::info!(job_id = %job_id, "Cancellation observed at checkpoint");
                    return Ok(PipelineEnd::Cancelled);
                }
            };
        }

        checkpoint!();
        progress.update(10, "Analyzing audio");
        let durations = self
            .probe_durations(config)
            .await
            .map_err(|source| StageError {
                stage: Stage::Probe,
                source,
            })?;
        let timing = resolve_timing(config, &durations).map_err(|source| StageError {
            stage: Stage::Probe,
            source,
        })?;
        progress.update(20, "Audio analysis complete");
        tracing::info!(
            job_id = %job_id,
            sources = durations.len(),
            total_secs = timing.total_secs(),
            "Audio analysis complete"
        );

        let subtitle_element = config
            .subtitle_element()
            .filter(|_| self.ctx.config.transcription.enabled);

        let cues: Vec<SubtitleCue> = if let Some(element) = subtitle_element {
            checkpoint!();
            let transcripts =
                self.transcribe_scenes(config, &element.language)
                    .await
                    .map_err(|source| StageError {
                        stage: Stage::Transcribe,
                        source,
                    })?;
            progress.update(30, "Transcription complete");

            checkpoint!();
            let cues = build_cues(&transcripts, &timing, element.settings.style);
            progress.update(50, "Subtitles generated");
            cues
        } else {
            tracing::debug!(job_id = %job_id, "Subtitles disabled, skipping transcription");
            Vec::new()
        };

        checkpoint!();
        let plan = build_render_plan(config, &timing, &cues);
        progress.update(60, "Render plan ready");

        checkpoint!();
        progress.update(70, "Encoding video");
        let output = self
            .encode(job_id, &plan)
            .await
            .map_err(|source| StageError {
                stage: Stage::Encode,
                source,
            })?;
        progress.update(95, "Encoding complete");

        checkpoint!();
        progress.update(100, "Completed");
        tracing::info!(job_id = %job_id, output = %output.display(), "Pipeline finished");

        Ok(PipelineEnd::Completed { output, plan })
    }

    /// Probe each distinct audio source once, fanning out up to the
    /// configured in-flight limit.
    async fn probe_durations(
        &self,
        config: &VideoConfig,
    ) -> Result<SourceDurations, ScenecastError> {
        let mut seen = HashSet::new();
        let sources: Vec<String> = config
            .scenes
            .iter()
            .flat_map(|s| s.audio_elements())
            .filter(|a| seen.insert(a.src.clone()))
            .map(|a| a.src.clone())
            .collect();

        if sources.is_empty() {
            // Scenes may still be timed by explicit overrides.
            return Ok(SourceDurations::new());
        }

        let timeout = Duration::from_secs(self.ctx.config.probe.timeout_secs);
        let semaphore = Arc::new(Semaphore::new(self.ctx.config.probe.concurrency.max(1)));
        let mut set = JoinSet::new();

        for src in sources {
            let prober = Arc::clone(&self.ctx.prober);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScenecastError::probe(format!("probe limiter closed: {e}")))?;
                let duration = prober.probe(&src, timeout).await?;
                Ok::<(String, f64), ScenecastError>((src, duration))
            });
        }

        let mut durations = SourceDurations::new();
        while let Some(joined) = set.join_next().await {
            let (src, duration) = joined
                .map_err(|e| ScenecastError::probe(format!("probe task panicked: {e}")))??;
            tracing::debug!(src = %src, duration, "Probed audio duration");
            durations.insert(src, duration);
        }
        Ok(durations)
    }

    /// Transcribe each audio-bearing scene's narration, fanning out up
    /// to the configured in-flight limit. Scene order is preserved in
    /// the returned transcripts.
    async fn transcribe_scenes(
        &self,
        config: &VideoConfig,
        language: &str,
    ) -> Result<Vec<SceneTranscript>, ScenecastError> {
        // One transcript per scene, from the scene's first audio element.
        let tasks: Vec<(usize, String, String)> = config
            .scenes
            .iter()
            .enumerate()
            .filter_map(|(i, scene)| {
                scene
                    .audio_elements()
                    .next()
                    .map(|audio| (i, scene.id.clone(), audio.src.clone()))
            })
            .collect();

        let timeout = Duration::from_secs(self.ctx.config.transcription.timeout_secs);
        let semaphore = Arc::new(Semaphore::new(
            self.ctx.config.transcription.concurrency.max(1),
        ));
        let mut set = JoinSet::new();

        for (index, scene_id, src) in tasks {
            let transcriber = Arc::clone(&self.ctx.transcriber);
            let semaphore = Arc::clone(&semaphore);
            let language = language.to_string();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    ScenecastError::transcription(format!("transcription limiter closed: {e}"))
                })?;
                let words = transcriber.transcribe(&src, &language, timeout).await?;
                Ok::<(usize, SceneTranscript), ScenecastError>((
                    index,
                    SceneTranscript { scene_id, words },
                ))
            });
        }

        let mut indexed = Vec::new();
        while let Some(joined) = set.join_next().await {
            let entry = joined.map_err(|e| {
                ScenecastError::transcription(format!("transcription task panicked: {e}"))
            })??;
            indexed.push(entry);
        }
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, t)| t).collect())
    }

    /// Serialize the plan, materialize the subtitle document, and hand
    /// everything to the encode backend.
    async fn encode(&self, job_id: JobId, plan: &RenderPlan) -> Result<PathBuf, ScenecastError> {
        std::fs::create_dir_all(&self.ctx.config.output_dir)?;
        let output = output_path(&self.ctx.config.output_dir, &job_id.to_string());

        let subtitle_path = match &plan.subtitles {
            Some(track) => {
                let path = std::env::temp_dir().join(format!("scenecast-{job_id}.ass"));
                std::fs::write(&path, render_ass(&track.cues, &track.settings))?;
                tracing::debug!(job_id = %job_id, path = %path.display(), "Wrote subtitle file");
                Some(path)
            }
            None => None,
        };

        let args = ffmpeg_args(
            plan,
            &self.ctx.config.encoder,
            subtitle_path.as_deref(),
            &output,
        );
        let timeout = Duration::from_secs(self.ctx.config.encoder.timeout_secs);
        tracing::info!(
            job_id = %job_id,
            backend = self.ctx.encoder.name(),
            args_len = args.len(),
            "Handing render plan to encoder"
        );
        let result = self.ctx.encoder.encode(&args, timeout).await;

        // The subtitle document is stage-local; drop it either way.
        if let Some(path) = subtitle_path {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %e, "Subtitle cleanup failed");
            }
        }

        result.map(|()| output)
    }
}
