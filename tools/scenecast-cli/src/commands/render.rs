//! Generate a video from a config file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scenecast_common::AppConfig;
use scenecast_engine::{JobScheduler, JobState, PipelineContext};
use scenecast_media::{FfprobeDurationProber, WhisperCliTranscriber};
use scenecast_render::FfmpegEncoder;

pub async fn run(
    config_path: PathBuf,
    output_dir: Option<PathBuf>,
    no_subtitles: bool,
) -> anyhow::Result<()> {
    let video_config = super::load_config(&config_path)?;

    let errors = video_config.validate();
    if !errors.is_empty() {
        for error in &errors {
            println!("  - {error}");
        }
        return Err(anyhow::anyhow!("{} config issue(s) found", errors.len()));
    }

    let mut app_config = AppConfig::load();
    if let Some(dir) = output_dir {
        app_config.output_dir = dir;
    }
    if no_subtitles {
        app_config.transcription.enabled = false;
    }

    let encoder = FfmpegEncoder::new();
    if !scenecast_render::EncodeBackend::is_available(&encoder) {
        return Err(anyhow::anyhow!(
            "ffmpeg not found in PATH; run `scenecast check`"
        ));
    }

    let transcriber = WhisperCliTranscriber::new(app_config.transcription.program.clone());
    let ctx = Arc::new(PipelineContext {
        config: app_config,
        prober: Arc::new(FfprobeDurationProber::new()),
        transcriber: Arc::new(transcriber),
        encoder: Arc::new(encoder),
    });

    let scheduler = JobScheduler::new(ctx);
    let job_id = scheduler
        .submit(video_config)
        .map_err(|e| anyhow::anyhow!("Submit failed: {e}"))?;

    println!("Rendering job {job_id}");

    let snapshot = loop {
        let snapshot = scheduler
            .status(job_id)
            .map_err(|e| anyhow::anyhow!("Status failed: {e}"))?;
        print!(
            "\r  [{:>3}%] {}                    ",
            snapshot.progress, snapshot.current_step
        );
        if snapshot.status.is_terminal() {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    };
    println!();

    let result = match snapshot.status {
        JobState::Completed => {
            let output = snapshot
                .output
                .expect("completed job always has an output reference");
            println!("Render complete: {}", output.display());
            if let Some(secs) = snapshot.duration_secs {
                println!("  Took {secs:.1}s");
            }
            Ok(())
        }
        JobState::Failed => Err(anyhow::anyhow!(
            "Render failed: {}",
            snapshot.error.unwrap_or_else(|| "unknown error".to_string())
        )),
        JobState::Cancelled => Err(anyhow::anyhow!("Render was cancelled")),
        other => Err(anyhow::anyhow!("Unexpected terminal state: {other}")),
    };

    scheduler.shutdown().await;
    result
}
