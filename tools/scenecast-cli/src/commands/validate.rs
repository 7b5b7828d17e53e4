//! Validate a config file.

use std::path::PathBuf;

pub fn run(config_path: PathBuf) -> anyhow::Result<()> {
    println!("Validating config at: {}", config_path.display());

    let config = super::load_config(&config_path)?;

    println!("  Resolution: {}x{}", config.width, config.height);
    println!(
        "  Scenes: {} ({} with audio)",
        config.scenes.len(),
        config.scenes_with_audio().count()
    );
    println!(
        "  Background video: {}",
        match config.background_video() {
            Some(bg) => bg.src.as_str(),
            None => "none",
        }
    );
    println!(
        "  Subtitles: {}",
        if config.subtitle_element().is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let errors = config.validate();
    if errors.is_empty() {
        println!("\nConfig is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        return Err(anyhow::anyhow!("{} issue(s) found", errors.len()));
    }

    Ok(())
}
