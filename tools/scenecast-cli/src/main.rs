//! Scenecast CLI — Command-line interface for declarative video generation.
//!
//! Usage:
//!   scenecast render <CONFIG>     Generate a video from a config file
//!   scenecast validate <CONFIG>   Validate a config file
//!   scenecast plan <CONFIG>       Resolve timing and print the render plan
//!   scenecast check               Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scenecast",
    about = "Declarative scene-based video generation",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video from a JSON config file
    Render {
        /// Path to the video config JSON
        config: PathBuf,

        /// Output directory (overrides the configured default)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Disable subtitle transcription for this run
        #[arg(long)]
        no_subtitles: bool,
    },

    /// Validate a config file without running anything
    Validate {
        /// Path to the video config JSON
        config: PathBuf,
    },

    /// Probe durations, resolve timing, and print the render plan
    Plan {
        /// Path to the video config JSON
        config: PathBuf,

        /// Also print the serialized ffmpeg arguments
        #[arg(long)]
        ffmpeg: bool,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    scenecast_common::logging::init_logging(&scenecast_common::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Render {
            config,
            output_dir,
            no_subtitles,
        } => commands::render::run(config, output_dir, no_subtitles).await,
        Commands::Validate { config } => commands::validate::run(config),
        Commands::Plan { config, ffmpeg } => commands::plan::run(config, ffmpeg).await,
        Commands::Check => commands::check::run(),
    }
}
