pub mod check;
pub mod plan;
pub mod render;
pub mod validate;

use std::path::Path;

use scenecast_scene_model::VideoConfig;

/// Load and parse a config file.
pub fn load_config(path: &Path) -> anyhow::Result<VideoConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))
}
