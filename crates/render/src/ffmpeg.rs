//! ffmpeg argument serialization of a render plan.
//!
//! The plan stays declarative; this module flattens it into the argv the
//! `EncodeBackend` executes. Input indexing: ffmpeg input 0 is the
//! background video when declared, otherwise a synthesized `lavfi` color
//! base, with the plan's remaining inputs following in order.

use std::path::Path;

use scenecast_common::EncoderConfig;

use crate::plan::{InputKind, RenderPlan};

/// Images are normalized to this square before overlaying.
const OVERLAY_IMAGE_SIZE: u32 = 500;

/// Serialize a render plan into a complete ffmpeg argument vector.
///
/// `subtitle_path` is the pre-rendered ASS document for the plan's
/// subtitle track, when one exists.
pub fn ffmpeg_args(
    plan: &RenderPlan,
    encoder: &EncoderConfig,
    subtitle_path: Option<&Path>,
    output_path: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".to_string(),
        "-protocol_whitelist".to_string(),
        "file,http,https,tcp,tls".to_string(),
    ];

    let encode_secs = plan.total_secs + plan.audio.pad_secs;

    // ffmpeg input 0: background video, or a solid color base.
    let shift = if let Some(bg) = &plan.background {
        let loops = bg
            .loop_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-1".to_string());
        args.push("-stream_loop".to_string());
        args.push(loops);
        args.push("-i".to_string());
        args.push(plan.inputs[bg.input].src.clone());
        0usize
    } else {
        args.push("-f".to_string());
        args.push("lavfi".to_string());
        args.push("-i".to_string());
        args.push(format!(
            "color=c=black:s={}x{}:d={}",
            plan.output.width, plan.output.height, encode_secs
        ));
        1usize
    };

    // Remaining inputs in plan order. With a background, plan index i is
    // ffmpeg index i; without one, everything shifts past the color base.
    for input in plan
        .inputs
        .iter()
        .filter(|i| i.kind != InputKind::BackgroundVideo)
    {
        args.push("-i".to_string());
        args.push(input.src.clone());
    }
    let ffmpeg_index = |plan_index: usize| plan_index + shift;

    let mut filters: Vec<String> = Vec::new();

    // Audio concatenation with a padded tail.
    let audio_map = match plan.audio.inputs.len() {
        0 => "0:a?".to_string(),
        1 => {
            filters.push(format!(
                "[{}:a]apad=pad_dur={}[final_audio]",
                ffmpeg_index(plan.audio.inputs[0]),
                plan.audio.pad_secs
            ));
            "[final_audio]".to_string()
        }
        n => {
            let joined: String = plan
                .audio
                .inputs
                .iter()
                .map(|&i| format!("[{}:a]", ffmpeg_index(i)))
                .collect();
            filters.push(format!("{joined}concat=n={n}:v=0:a=1[concatenated_audio]"));
            filters.push(format!(
                "[concatenated_audio]apad=pad_dur={}[final_audio]",
                plan.audio.pad_secs
            ));
            "[final_audio]".to_string()
        }
    };

    // Image overlays, bottom-most first (the plan is already z-sorted).
    let mut current_video = "0:v".to_string();
    for (i, overlay) in plan.overlays.iter().enumerate() {
        filters.push(format!(
            "[{}:v]scale={size}:{size}[scaled_img_{i}]",
            ffmpeg_index(overlay.input),
            size = OVERLAY_IMAGE_SIZE,
        ));
        filters.push(format!(
            "[{current_video}][scaled_img_{i}]overlay={x}:{y}:enable=between(t\\,{start}\\,{end})[overlay_{i}]",
            x = overlay.x,
            y = overlay.y,
            start = overlay.start_secs,
            end = overlay.end_secs,
        ));
        current_video = format!("overlay_{i}");
    }

    // Subtitle burn-in.
    if let Some(path) = subtitle_path {
        filters.push(format!(
            "[{current_video}]ass={}[subtitled_video]",
            path.display()
        ));
        current_video = "subtitled_video".to_string();
    }

    if filters.is_empty() {
        args.push("-map".to_string());
        args.push("0:v".to_string());
    } else {
        args.push("-filter_complex".to_string());
        args.push(filters.join(";"));
        args.push("-map".to_string());
        if current_video == "0:v" {
            args.push("0:v".to_string());
        } else {
            args.push(format!("[{current_video}]"));
        }
    }

    args.push("-map".to_string());
    args.push(audio_map);

    args.extend([
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        encoder.preset.clone(),
        "-crf".to_string(),
        encoder.crf.to_string(),
    ]);

    args.push("-s".to_string());
    args.push(format!("{}x{}", plan.output.width, plan.output.height));

    args.push("-t".to_string());
    args.push(encode_secs.to_string());

    args.push(output_path.display().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{
        AudioTrack, BackgroundTransform, ImageOverlay, OutputSpec, PlanInput, RenderPlan,
    };
    use scenecast_scene_model::{Quality, ResizeMode};
    use std::path::PathBuf;

    fn plan_with_background() -> RenderPlan {
        RenderPlan {
            inputs: vec![
                PlanInput {
                    src: "bg.mp4".to_string(),
                    kind: InputKind::BackgroundVideo,
                },
                PlanInput {
                    src: "a1.mp3".to_string(),
                    kind: InputKind::Audio,
                },
                PlanInput {
                    src: "a2.mp3".to_string(),
                    kind: InputKind::Audio,
                },
                PlanInput {
                    src: "logo.png".to_string(),
                    kind: InputKind::Image,
                },
            ],
            background: Some(BackgroundTransform {
                input: 0,
                volume: 0.5,
                resize: ResizeMode::Fit,
                loop_count: Some(2),
                z_index: -1,
            }),
            overlays: vec![ImageOverlay {
                input: 3,
                scene_id: "one".to_string(),
                x: 290,
                y: 200,
                start_secs: 0.0,
                end_secs: 5.0,
                z_index: 0,
            }],
            audio: AudioTrack {
                inputs: vec![1, 2],
                pad_secs: 2.0,
            },
            subtitles: None,
            output: OutputSpec {
                width: 1080,
                height: 1920,
                quality: Quality::High,
            },
            total_secs: 12.25,
        }
    }

    fn encoder() -> EncoderConfig {
        EncoderConfig::default()
    }

    #[test]
    fn test_background_inputs_and_loops() {
        let args = ffmpeg_args(
            &plan_with_background(),
            &encoder(),
            None,
            &PathBuf::from("out.mp4"),
        );
        let joined = args.join(" ");

        assert!(args[0] == "-y");
        assert!(joined.contains("-stream_loop 2 -i bg.mp4"));
        assert!(joined.contains("-i a1.mp3 -i a2.mp3 -i logo.png"));
        assert!(joined.ends_with("out.mp4"));
    }

    #[test]
    fn test_audio_concat_and_padding() {
        let args = ffmpeg_args(
            &plan_with_background(),
            &encoder(),
            None,
            &PathBuf::from("out.mp4"),
        );
        let filter = args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1].clone();

        assert!(filter.contains("[1:a][2:a]concat=n=2:v=0:a=1[concatenated_audio]"));
        assert!(filter.contains("[concatenated_audio]apad=pad_dur=2[final_audio]"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[final_audio]"));
    }

    #[test]
    fn test_overlay_enable_window() {
        let args = ffmpeg_args(
            &plan_with_background(),
            &encoder(),
            None,
            &PathBuf::from("out.mp4"),
        );
        let filter = args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1].clone();

        assert!(filter.contains("[3:v]scale=500:500[scaled_img_0]"));
        assert!(filter
            .contains("[0:v][scaled_img_0]overlay=290:200:enable=between(t\\,0\\,5)[overlay_0]"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[overlay_0]"));
    }

    #[test]
    fn test_encode_settings_and_duration() {
        let args = ffmpeg_args(
            &plan_with_background(),
            &encoder(),
            None,
            &PathBuf::from("out.mp4"),
        );
        let joined = args.join(" ");

        assert!(joined.contains("-c:v libx264 -preset fast -crf 23"));
        assert!(joined.contains("-s 1080x1920"));
        // 12.25 + 2.0 pad
        assert!(joined.contains("-t 14.25"));
    }

    #[test]
    fn test_subtitle_filter_chains_after_overlays() {
        let args = ffmpeg_args(
            &plan_with_background(),
            &encoder(),
            Some(&PathBuf::from("/tmp/subs.ass")),
            &PathBuf::from("out.mp4"),
        );
        let filter = args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1].clone();

        assert!(filter.contains("[overlay_0]ass=/tmp/subs.ass[subtitled_video]"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "-map" && w[1] == "[subtitled_video]"));
    }

    #[test]
    fn test_missing_background_uses_color_base() {
        let mut plan = plan_with_background();
        plan.background = None;
        plan.inputs.remove(0);
        // plan indexes shift down after removing the background input
        plan.audio.inputs = vec![0, 1];
        plan.overlays[0].input = 2;

        let args = ffmpeg_args(&plan, &encoder(), None, &PathBuf::from("out.mp4"));
        let joined = args.join(" ");

        assert!(joined.contains("-f lavfi -i color=c=black:s=1080x1920:d=14.25"));
        // audio inputs land at ffmpeg indexes 1 and 2
        let filter = args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1].clone();
        assert!(filter.contains("[1:a][2:a]concat"));
        assert!(filter.contains("[3:v]scale=500:500"));
    }

    #[test]
    fn test_infinite_loop_for_unknown_background_duration() {
        let mut plan = plan_with_background();
        plan.background.as_mut().unwrap().loop_count = None;
        let args = ffmpeg_args(&plan, &encoder(), None, &PathBuf::from("out.mp4"));
        assert!(args.join(" ").contains("-stream_loop -1 -i bg.mp4"));
    }
}
