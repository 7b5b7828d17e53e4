//! Check system capabilities.

use scenecast_common::AppConfig;
use scenecast_media::{FfprobeDurationProber, WhisperCliTranscriber};
use scenecast_render::{EncodeBackend, FfmpegEncoder};

pub fn run() -> anyhow::Result<()> {
    println!("Scenecast System Check");
    println!("{}", "=".repeat(50));

    let config = AppConfig::load();

    let encoder = FfmpegEncoder::new();
    if encoder.is_available() {
        match encoder.version() {
            Some(version) => println!("[OK] Encoder: {version}"),
            None => println!("[OK] Encoder: ffmpeg (version unknown)"),
        }
    } else {
        println!("[FAIL] Encoder: ffmpeg not found in PATH");
    }

    let prober = FfprobeDurationProber::new();
    if prober.is_available() {
        println!("[OK] Prober: ffprobe");
    } else {
        println!("[FAIL] Prober: ffprobe not found in PATH");
    }

    let transcriber = WhisperCliTranscriber::new(config.transcription.program.clone());
    if transcriber.is_available() {
        println!("[OK] Transcriber: {}", config.transcription.program);
    } else if config.transcription.enabled {
        println!(
            "[WARN] Transcriber: {} not found (subtitled renders will fail)",
            config.transcription.program
        );
    } else {
        println!("[--] Transcriber: disabled in config");
    }

    println!("[OK] Output directory: {}", config.output_dir.display());
    println!(
        "[OK] Workers: {} (queue depth {})",
        config.scheduler.workers, config.scheduler.queue_depth
    );

    let ready = encoder.is_available() && prober.is_available();
    println!();
    if ready {
        println!("All required tools are available. Scenecast is ready.");
    } else {
        println!("Some required tools are missing. Install ffmpeg to continue.");
    }

    Ok(())
}
