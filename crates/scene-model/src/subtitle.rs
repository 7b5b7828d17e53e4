//! Subtitle styling configuration.

use serde::{Deserialize, Serialize};

/// Subtitle styling configuration.
///
/// Field aliases accept both kebab-case (wire format) and snake_case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Rendering style.
    pub style: SubtitleStyle,

    /// Font family name.
    #[serde(rename = "font-family", alias = "font_family")]
    pub font_family: String,

    /// Font size in points.
    #[serde(rename = "font-size", alias = "font_size")]
    pub font_size: u32,

    /// Color of the highlighted word (`#RRGGBB`).
    #[serde(rename = "word-color", alias = "word_color")]
    pub word_color: String,

    /// Color of the surrounding line text (`#RRGGBB`).
    #[serde(rename = "line-color", alias = "line_color")]
    pub line_color: String,

    /// Drop-shadow color (`#RRGGBB`).
    #[serde(rename = "shadow-color", alias = "shadow_color")]
    pub shadow_color: String,

    /// Drop-shadow offset in pixels.
    #[serde(rename = "shadow-offset", alias = "shadow_offset")]
    pub shadow_offset: u32,

    /// Background box color (`#RRGGBB`).
    #[serde(rename = "box-color", alias = "box_color")]
    pub box_color: String,

    /// Screen anchor for the subtitle track.
    pub position: SubtitlePosition,

    /// Text outline color (`#RRGGBB`).
    #[serde(rename = "outline-color", alias = "outline_color")]
    pub outline_color: String,

    /// Text outline width in pixels.
    #[serde(rename = "outline-width", alias = "outline_width")]
    pub outline_width: u32,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            style: SubtitleStyle::Progressive,
            font_family: "Arial".to_string(),
            font_size: 24,
            word_color: "#FFFFFF".to_string(),
            line_color: "#FFFFFF".to_string(),
            shadow_color: "#000000".to_string(),
            shadow_offset: 2,
            box_color: "#000000".to_string(),
            position: SubtitlePosition::CenterTop,
            outline_color: "#000000".to_string(),
            outline_width: 3,
        }
    }
}

/// Subtitle rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleStyle {
    /// Whole lines shown for their full duration.
    Classic,
    /// One cue per word, redrawing the line with the current word
    /// distinguished.
    #[default]
    Progressive,
}

/// One of the nine screen anchor positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitlePosition {
    LeftBottom,
    CenterBottom,
    RightBottom,
    LeftCenter,
    CenterCenter,
    RightCenter,
    LeftTop,
    CenterTop,
    RightTop,
}

impl SubtitlePosition {
    /// The ASS `\an`-style numpad alignment for this anchor (1-9).
    pub fn ass_alignment(&self) -> u8 {
        match self {
            SubtitlePosition::LeftBottom => 1,
            SubtitlePosition::CenterBottom => 2,
            SubtitlePosition::RightBottom => 3,
            SubtitlePosition::LeftCenter => 4,
            SubtitlePosition::CenterCenter => 5,
            SubtitlePosition::RightCenter => 6,
            SubtitlePosition::LeftTop => 7,
            SubtitlePosition::CenterTop => 8,
            SubtitlePosition::RightTop => 9,
        }
    }
}
