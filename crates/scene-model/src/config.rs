//! Video configuration types.
//!
//! A `VideoConfig` is the top-level container submitted to the engine:
//! global elements (optional background video, optional subtitle spec)
//! plus an ordered list of scenes. Configs are treated as immutable and
//! pre-validated once constructed.

use serde::{Deserialize, Serialize};

use crate::subtitle::SubtitleSettings;

/// Complete video configuration (`VideoConfig` on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Free-form comment, ignored by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Named resolution preset ("custom" when width/height are explicit).
    #[serde(default = "default_resolution")]
    pub resolution: String,

    /// Output quality tier.
    #[serde(default)]
    pub quality: Quality,

    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// Ordered scenes; playback order is declaration order.
    pub scenes: Vec<Scene>,

    /// Global elements (background video, subtitle spec).
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_resolution() -> String {
    "custom".to_string()
}

/// Output quality tier, mapped to encoder settings downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

/// A time-bounded segment of the output video with its own elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Unique scene identifier.
    pub id: String,

    /// Background color, or "transparent" to show the layer below.
    #[serde(
        default = "default_background_color",
        rename = "background-color",
        alias = "background_color"
    )]
    pub background_color: String,

    /// Explicit scene duration override in seconds.
    ///
    /// When absent, the scene lasts as long as its concatenated audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Ordered elements attached to this scene.
    pub elements: Vec<Element>,
}

fn default_background_color() -> String {
    "transparent".to_string()
}

/// One media or annotation unit, discriminated by its `type` tag.
///
/// This is a closed set: consumers match exhaustively instead of probing
/// fields, so adding a kind is a compile-visible change everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    /// Scene narration audio; drives scene duration.
    Audio(AudioElement),

    /// Timed image overlay within a scene.
    Image(ImageElement),

    /// Background video behind all scene content.
    Video(VideoElement),

    /// Auto-generated subtitle track.
    Subtitles(SubtitleElement),
}

impl Element {
    /// The wire-format discriminant for this element kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Audio(_) => "audio",
            Element::Image(_) => "image",
            Element::Video(_) => "video",
            Element::Subtitles(_) => "subtitles",
        }
    }
}

/// Scene audio element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioElement {
    /// Media source reference (URL or path).
    pub src: String,
}

/// Scene image element, overlaid at a fixed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    /// Media source reference (URL or path).
    pub src: String,

    /// Left edge in output pixels. No automatic centering.
    pub x: u32,

    /// Top edge in output pixels.
    pub y: u32,

    /// Stack position among overlays; ties keep declaration order.
    #[serde(default, rename = "z-index", alias = "z_index")]
    pub z_index: i32,
}

/// Background video element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoElement {
    /// Media source reference (URL or path).
    pub src: String,

    /// Stack position; -1 places the video behind all scene content.
    #[serde(default = "default_video_z_index", rename = "z-index", alias = "z_index")]
    pub z_index: i32,

    /// Playback volume [0.0, 1.0].
    #[serde(default = "default_video_volume")]
    pub volume: f64,

    /// How the video is fitted when its size differs from the output.
    #[serde(default)]
    pub resize: ResizeMode,

    /// Known source duration in seconds, if the caller has it.
    ///
    /// Used to derive the loop count when the background is shorter than
    /// the final timeline; unknown duration means loop indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

fn default_video_z_index() -> i32 {
    -1
}

fn default_video_volume() -> f64 {
    0.5
}

/// Background resize policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Letterbox to preserve aspect ratio.
    #[default]
    Fit,
    /// Fill the frame, cropping overflow.
    Cover,
    /// Stretch to the exact output size.
    Stretch,
}

/// Global subtitle element enabling auto-generated subtitles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleElement {
    /// Optional element identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Styling configuration.
    pub settings: SubtitleSettings,

    /// Transcription language hint (ISO 639-1).
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl VideoConfig {
    /// The background video element, if one is declared.
    pub fn background_video(&self) -> Option<&VideoElement> {
        self.elements.iter().find_map(|e| match e {
            Element::Video(v) => Some(v),
            _ => None,
        })
    }

    /// The subtitle element, if subtitles are enabled.
    pub fn subtitle_element(&self) -> Option<&SubtitleElement> {
        self.elements.iter().find_map(|e| match e {
            Element::Subtitles(s) => Some(s),
            _ => None,
        })
    }

    /// Scenes that carry at least one audio element.
    pub fn scenes_with_audio(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter().filter(|s| s.audio_elements().next().is_some())
    }

    /// Check the config for structural problems.
    ///
    /// Returns human-readable findings; empty means the config can be
    /// submitted.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if !(100..=4000).contains(&self.width) || !(100..=4000).contains(&self.height) {
            errors.push(format!(
                "Resolution {}x{} outside supported range 100-4000",
                self.width, self.height
            ));
        }

        if self.scenes.is_empty() {
            errors.push("No scenes declared".to_string());
        }

        let mut seen_ids = std::collections::HashSet::new();
        for scene in &self.scenes {
            if !seen_ids.insert(scene.id.as_str()) {
                errors.push(format!("Duplicate scene id: {}", scene.id));
            }
            if scene.audio_elements().next().is_none() && scene.duration.is_none() {
                errors.push(format!(
                    "Scene '{}' has no audio and no explicit duration",
                    scene.id
                ));
            }
            for element in &scene.elements {
                match element {
                    Element::Audio(a) if a.src.trim().is_empty() => {
                        errors.push(format!("Scene '{}': empty audio src", scene.id));
                    }
                    Element::Image(i) if i.src.trim().is_empty() => {
                        errors.push(format!("Scene '{}': empty image src", scene.id));
                    }
                    Element::Video(_) | Element::Subtitles(_) => {
                        errors.push(format!(
                            "Scene '{}': {} elements belong at the top level",
                            scene.id,
                            element.kind()
                        ));
                    }
                    _ => {}
                }
            }
        }

        if let Some(bg) = self.background_video() {
            if bg.src.trim().is_empty() {
                errors.push("Background video has an empty src".to_string());
            }
            if !(0.0..=1.0).contains(&bg.volume) {
                errors.push(format!("Background volume {} outside 0.0-1.0", bg.volume));
            }
        }

        errors
    }
}

impl Scene {
    /// Audio elements in declaration order.
    pub fn audio_elements(&self) -> impl Iterator<Item = &AudioElement> {
        self.elements.iter().filter_map(|e| match e {
            Element::Audio(a) => Some(a),
            _ => None,
        })
    }

    /// Image elements in declaration order.
    pub fn image_elements(&self) -> impl Iterator<Item = &ImageElement> {
        self.elements.iter().filter_map(|e| match e {
            Element::Image(i) => Some(i),
            _ => None,
        })
    }

    /// Whether the scene background is transparent.
    pub fn is_transparent(&self) -> bool {
        self.background_color.eq_ignore_ascii_case("transparent")
    }
}
