//! Resolve timing and print the render plan.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use scenecast_common::AppConfig;
use scenecast_media::{DurationProber, FfprobeDurationProber};
use scenecast_render::{build_render_plan, ffmpeg_args, output_path};
use scenecast_timeline::{resolve_timing, SourceDurations};

pub async fn run(config_path: PathBuf, print_ffmpeg: bool) -> anyhow::Result<()> {
    let config = super::load_config(&config_path)?;
    let app_config = AppConfig::load();

    let prober = FfprobeDurationProber::new();
    if !prober.is_available() {
        return Err(anyhow::anyhow!(
            "ffprobe not found in PATH; run `scenecast check`"
        ));
    }

    // Probe each distinct audio source sequentially; planning is a
    // one-off inspection, not the pipeline.
    let timeout = Duration::from_secs(app_config.probe.timeout_secs);
    let mut seen = HashSet::new();
    let mut durations = SourceDurations::new();
    for scene in &config.scenes {
        for audio in scene.audio_elements() {
            if seen.insert(audio.src.clone()) {
                let duration = prober
                    .probe(&audio.src, timeout)
                    .await
                    .map_err(|e| anyhow::anyhow!("Probe failed: {e}"))?;
                durations.insert(audio.src.clone(), duration);
            }
        }
    }

    let timing =
        resolve_timing(&config, &durations).map_err(|e| anyhow::anyhow!("Timing failed: {e}"))?;

    println!("Timeline ({:.2}s total):", timing.total_secs());
    for scene in timing.scenes() {
        println!(
            "  {:<20} {:>8.2}s - {:>8.2}s  ({:.2}s)",
            scene.scene_id, scene.start_secs, scene.end_secs, scene.duration_secs
        );
    }

    let plan = build_render_plan(&config, &timing, &[]);
    println!("\nInputs:");
    for (i, input) in plan.inputs.iter().enumerate() {
        println!("  [{i}] {:?} {}", input.kind, input.src);
    }
    println!("Overlays: {}", plan.overlays.len());
    for overlay in &plan.overlays {
        println!(
            "  {} at ({}, {}) during {:.2}s - {:.2}s (z {})",
            plan.inputs[overlay.input].src,
            overlay.x,
            overlay.y,
            overlay.start_secs,
            overlay.end_secs,
            overlay.z_index
        );
    }

    if print_ffmpeg {
        let output = output_path(&app_config.output_dir, "preview");
        let args = ffmpeg_args(&plan, &app_config.encoder, None, &output);
        println!("\nffmpeg {}", args.join(" "));
    }

    Ok(())
}
