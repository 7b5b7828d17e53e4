//! Render plan building.
//!
//! `build_render_plan` deterministically assembles the declarative
//! description of inputs, overlays, and the output spec in a single
//! pass. It performs no I/O and depends only on its arguments, so
//! identical inputs always yield an identical plan.

use scenecast_scene_model::{Quality, ResizeMode, SubtitleSettings, VideoConfig};
use scenecast_timeline::{ResolvedTiming, SubtitleCue};
use serde::{Deserialize, Serialize};

/// Seconds of audio padding appended after the last scene so the encoder
/// never truncates a trailing word.
pub const AUDIO_PAD_SECS: f64 = 2.0;

/// The fully resolved, declarative rendering plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    /// Distinct media inputs, ordered: background video first, then each
    /// scene's audio and image sources in declaration order.
    pub inputs: Vec<PlanInput>,

    /// Background video transform, when a background is declared.
    pub background: Option<BackgroundTransform>,

    /// Timed image overlays, sorted by z-index (declaration order on ties).
    pub overlays: Vec<ImageOverlay>,

    /// Ordered audio concatenation track.
    pub audio: AudioTrack,

    /// Subtitle track, when subtitles are enabled and cues exist.
    pub subtitles: Option<SubtitleTrack>,

    /// Output file specification.
    pub output: OutputSpec,

    /// Resolved timeline length in seconds (sum of scene durations).
    pub total_secs: f64,
}

/// One distinct media input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    /// Media source reference.
    pub src: String,

    /// What the input feeds.
    pub kind: InputKind,
}

/// Input role within the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    BackgroundVideo,
    Audio,
    Image,
}

/// Transform applied to the background video for the full timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundTransform {
    /// Index into `inputs`.
    pub input: usize,

    /// Playback volume [0.0, 1.0].
    pub volume: f64,

    /// Fit policy when the source size differs from the output.
    pub resize: ResizeMode,

    /// Loop count needed to cover the timeline; `None` loops without
    /// bound (source duration unknown).
    pub loop_count: Option<u32>,

    /// Declared stack position (-1 = behind all scene content).
    pub z_index: i32,
}

/// A timed image overlay, active exactly during its scene's window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOverlay {
    /// Index into `inputs`.
    pub input: usize,

    /// Scene that owns this overlay.
    pub scene_id: String,

    /// Left edge in output pixels.
    pub x: u32,

    /// Top edge in output pixels.
    pub y: u32,

    /// Window start on the global timeline.
    pub start_secs: f64,

    /// Window end on the global timeline (exclusive).
    pub end_secs: f64,

    /// Declared stack position.
    pub z_index: i32,
}

/// Ordered audio inputs concatenated into the final track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Indexes into `inputs`, in playback order. A source referenced by
    /// several scenes appears once per reference.
    pub inputs: Vec<usize>,

    /// Trailing silence appended after concatenation.
    pub pad_secs: f64,
}

/// Subtitle track reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Ordered cues on the global timeline.
    pub cues: Vec<SubtitleCue>,

    /// Styling, including the screen anchor.
    pub settings: SubtitleSettings,
}

/// Output file specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// Assemble the render plan from the validated config, resolved timing,
/// and built cues.
pub fn build_render_plan(
    config: &VideoConfig,
    timing: &ResolvedTiming,
    cues: &[SubtitleCue],
) -> RenderPlan {
    let mut inputs: Vec<PlanInput> = Vec::new();

    let total_secs = timing.total_secs();

    let background = config.background_video().map(|bg| {
        let input = intern_input(&mut inputs, &bg.src, InputKind::BackgroundVideo);
        BackgroundTransform {
            input,
            volume: bg.volume,
            resize: bg.resize,
            loop_count: loop_count(bg.duration, total_secs + AUDIO_PAD_SECS),
            z_index: bg.z_index,
        }
    });

    let mut audio_inputs = Vec::new();
    let mut overlays = Vec::new();

    for scene in &config.scenes {
        for audio in scene.audio_elements() {
            audio_inputs.push(intern_input(&mut inputs, &audio.src, InputKind::Audio));
        }

        let window = timing.get(&scene.id);
        for image in scene.image_elements() {
            let Some(window) = window else {
                continue;
            };
            let input = intern_input(&mut inputs, &image.src, InputKind::Image);
            overlays.push(ImageOverlay {
                input,
                scene_id: scene.id.clone(),
                x: image.x,
                y: image.y,
                start_secs: window.start_secs,
                end_secs: window.end_secs,
                z_index: image.z_index,
            });
        }
    }

    // Stable sort keeps declaration order among equal z-indexes.
    overlays.sort_by_key(|o| o.z_index);

    let subtitles = config.subtitle_element().and_then(|element| {
        if cues.is_empty() {
            tracing::debug!("Subtitles enabled but no cues were built; omitting track");
            return None;
        }
        Some(SubtitleTrack {
            cues: cues.to_vec(),
            settings: element.settings.clone(),
        })
    });

    RenderPlan {
        inputs,
        background,
        overlays,
        audio: AudioTrack {
            inputs: audio_inputs,
            pad_secs: AUDIO_PAD_SECS,
        },
        subtitles,
        output: OutputSpec {
            width: config.width,
            height: config.height,
            quality: config.quality,
        },
        total_secs,
    }
}

/// Index of `src` in the input list, appending it on first sight.
fn intern_input(inputs: &mut Vec<PlanInput>, src: &str, kind: InputKind) -> usize {
    match inputs.iter().position(|i| i.src == src && i.kind == kind) {
        Some(idx) => idx,
        None => {
            inputs.push(PlanInput {
                src: src.to_string(),
                kind,
            });
            inputs.len() - 1
        }
    }
}

/// Loop count needed for a background of `bg_secs` to cover
/// `required_secs`. Unknown or non-positive durations loop unbounded.
fn loop_count(bg_secs: Option<f64>, required_secs: f64) -> Option<u32> {
    match bg_secs {
        Some(d) if d > 0.0 => Some((required_secs / d) as u32 + 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecast_scene_model::{
        AudioElement, Element, ImageElement, Scene, SubtitleElement, SubtitleSettings,
        VideoElement,
    };
    use scenecast_timeline::{resolve_timing, SourceDurations};

    fn config_and_timing() -> (VideoConfig, ResolvedTiming) {
        let config = VideoConfig {
            comment: None,
            resolution: "custom".to_string(),
            quality: Quality::High,
            width: 1080,
            height: 1920,
            scenes: vec![
                Scene {
                    id: "one".to_string(),
                    background_color: "transparent".to_string(),
                    duration: None,
                    elements: vec![
                        Element::Audio(AudioElement {
                            src: "a1.mp3".to_string(),
                        }),
                        Element::Image(ImageElement {
                            src: "logo.png".to_string(),
                            x: 290,
                            y: 200,
                            z_index: 0,
                        }),
                    ],
                },
                Scene {
                    id: "two".to_string(),
                    background_color: "transparent".to_string(),
                    duration: None,
                    elements: vec![
                        Element::Audio(AudioElement {
                            src: "a2.mp3".to_string(),
                        }),
                        Element::Image(ImageElement {
                            src: "chart.png".to_string(),
                            x: 100,
                            y: 500,
                            z_index: 2,
                        }),
                        Element::Image(ImageElement {
                            src: "badge.png".to_string(),
                            x: 10,
                            y: 10,
                            z_index: 2,
                        }),
                    ],
                },
            ],
            elements: vec![
                Element::Video(VideoElement {
                    src: "bg.mp4".to_string(),
                    z_index: -1,
                    volume: 0.5,
                    resize: ResizeMode::Fit,
                    duration: Some(10.0),
                }),
                Element::Subtitles(SubtitleElement {
                    id: None,
                    settings: SubtitleSettings::default(),
                    language: "en".to_string(),
                }),
            ],
        };
        let durations: SourceDurations =
            [("a1.mp3".to_string(), 5.0), ("a2.mp3".to_string(), 7.25)]
                .into_iter()
                .collect();
        let timing = resolve_timing(&config, &durations).unwrap();
        (config, timing)
    }

    fn cue(start: f64, end: f64) -> SubtitleCue {
        SubtitleCue {
            start_secs: start,
            end_secs: end,
            kind: scenecast_timeline::CueKind::Line {
                text: "text".to_string(),
            },
        }
    }

    #[test]
    fn test_input_ordering_background_first() {
        let (config, timing) = config_and_timing();
        let plan = build_render_plan(&config, &timing, &[]);

        let srcs: Vec<&str> = plan.inputs.iter().map(|i| i.src.as_str()).collect();
        assert_eq!(
            srcs,
            vec!["bg.mp4", "a1.mp3", "logo.png", "a2.mp3", "chart.png", "badge.png"]
        );
        assert_eq!(plan.inputs[0].kind, InputKind::BackgroundVideo);
    }

    #[test]
    fn test_overlay_windows_match_scene_timing() {
        let (config, timing) = config_and_timing();
        let plan = build_render_plan(&config, &timing, &[]);

        let logo = plan
            .overlays
            .iter()
            .find(|o| o.scene_id == "one")
            .unwrap();
        assert!((logo.start_secs - 0.0).abs() < 1e-9);
        assert!((logo.end_secs - 5.0).abs() < 1e-9);
        assert_eq!((logo.x, logo.y), (290, 200));

        let chart = plan
            .overlays
            .iter()
            .find(|o| o.input == 4)
            .unwrap();
        assert!((chart.start_secs - 5.0).abs() < 1e-9);
        assert!((chart.end_secs - 12.25).abs() < 1e-9);
    }

    #[test]
    fn test_z_order_ties_keep_declaration_order() {
        let (config, timing) = config_and_timing();
        let plan = build_render_plan(&config, &timing, &[]);

        // logo (z 0) sorts below the two z=2 overlays, which keep
        // their declared order: chart before badge.
        let order: Vec<&str> = plan
            .overlays
            .iter()
            .map(|o| plan.inputs[o.input].src.as_str())
            .collect();
        assert_eq!(order, vec!["logo.png", "chart.png", "badge.png"]);
    }

    #[test]
    fn test_background_loop_count() {
        let (config, timing) = config_and_timing();
        let plan = build_render_plan(&config, &timing, &[]);

        let bg = plan.background.as_ref().unwrap();
        // (12.25 + 2.0) / 10.0 = 1.425 -> 1 + 1 = 2 loops
        assert_eq!(bg.loop_count, Some(2));
        assert_eq!(bg.z_index, -1);
        assert!((bg.volume - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_background_duration_loops_unbounded() {
        let (mut config, timing) = config_and_timing();
        if let Some(Element::Video(v)) = config.elements.first_mut() {
            v.duration = None;
        }
        let plan = build_render_plan(&config, &timing, &[]);
        assert_eq!(plan.background.unwrap().loop_count, None);
    }

    #[test]
    fn test_subtitle_track_requires_cues() {
        let (config, timing) = config_and_timing();

        let without = build_render_plan(&config, &timing, &[]);
        assert!(without.subtitles.is_none());

        let with = build_render_plan(&config, &timing, &[cue(0.0, 1.0)]);
        assert_eq!(with.subtitles.unwrap().cues.len(), 1);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let (config, timing) = config_and_timing();
        let cues = vec![cue(0.0, 1.0), cue(1.0, 2.0)];

        let a = build_render_plan(&config, &timing, &cues);
        let b = build_render_plan(&config, &timing, &cues);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn test_repeated_audio_source_plays_per_reference() {
        let (mut config, _) = config_and_timing();
        // Both scenes use the same narration file.
        config.scenes[1].elements[0] = Element::Audio(AudioElement {
            src: "a1.mp3".to_string(),
        });
        let durations: SourceDurations =
            [("a1.mp3".to_string(), 5.0)].into_iter().collect();
        let timing = resolve_timing(&config, &durations).unwrap();

        let plan = build_render_plan(&config, &timing, &[]);
        let audio_input_count = plan
            .inputs
            .iter()
            .filter(|i| i.kind == InputKind::Audio)
            .count();
        assert_eq!(audio_input_count, 1);
        assert_eq!(plan.audio.inputs.len(), 2);
        assert_eq!(plan.audio.inputs[0], plan.audio.inputs[1]);
    }

    #[test]
    fn test_no_background_video() {
        let (mut config, timing) = config_and_timing();
        config.elements.retain(|e| !matches!(e, Element::Video(_)));
        let plan = build_render_plan(&config, &timing, &[]);
        assert!(plan.background.is_none());
        assert_eq!(plan.inputs[0].kind, InputKind::Audio);
    }
}
