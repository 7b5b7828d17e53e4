//! Subtitle cue building.
//!
//! Maps per-scene transcripts plus style configuration into an ordered
//! cue track on the global timeline. Invariant: cues are strictly
//! ordered by start time and never overlap — adjacent cues may touch
//! (`end == start`) but never cross.

use scenecast_scene_model::SubtitleStyle;
use serde::{Deserialize, Serialize};

use crate::timing::ResolvedTiming;
use crate::transcript::{SceneTranscript, WordSpan};

/// Longest line the grouping heuristic will build, in characters.
pub const MAX_LINE_CHARS: usize = 42;

/// Longest time window a single line may cover, in seconds.
pub const MAX_LINE_DURATION_SECS: f64 = 5.0;

/// One timed subtitle display unit on the global timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Global start time in seconds.
    pub start_secs: f64,

    /// Global end time in seconds.
    pub end_secs: f64,

    /// What this cue displays.
    pub kind: CueKind,
}

/// Display payload of a cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CueKind {
    /// A whole line shown for the cue's duration (classic style).
    Line {
        /// Line text.
        text: String,
    },

    /// One word of a line distinguished (progressive style). The cue
    /// carries the enclosing line so the renderer can redraw it with the
    /// current word highlighted.
    Word {
        /// Full text of the enclosing line.
        line_text: String,
        /// Zero-based index of the highlighted word within the line.
        word_index: usize,
    },
}

impl SubtitleCue {
    /// The line text this cue displays.
    pub fn line_text(&self) -> &str {
        match &self.kind {
            CueKind::Line { text } => text,
            CueKind::Word { line_text, .. } => line_text,
        }
    }
}

/// Build the cue track for a subtitle layer.
///
/// Transcripts are matched to scenes through `timing`; a transcript for
/// an unknown scene is skipped with a warning. All times are re-based
/// from the audio-local clock into the global timeline
/// (`global = scene.start + local`) and clamped to the scene window.
pub fn build_cues(
    transcripts: &[SceneTranscript],
    timing: &ResolvedTiming,
    style: SubtitleStyle,
) -> Vec<SubtitleCue> {
    let mut cues = Vec::new();
    let mut prev_end = 0.0f64;

    // Walk scenes in timeline order so the track is globally ordered.
    for scene in timing.scenes() {
        let Some(transcript) = transcripts.iter().find(|t| t.scene_id == scene.scene_id)
        else {
            continue;
        };
        if transcript.is_empty() {
            continue;
        }

        let lines = group_lines(&transcript.words);

        match style {
            SubtitleStyle::Classic => {
                for line in &lines {
                    let text = join_words(line);
                    let start = (scene.start_secs + line[0].start_secs)
                        .clamp(scene.start_secs, scene.end_secs)
                        .max(prev_end);
                    let end = (scene.start_secs + line[line.len() - 1].end_secs)
                        .clamp(scene.start_secs, scene.end_secs)
                        .max(start);
                    cues.push(SubtitleCue {
                        start_secs: start,
                        end_secs: end,
                        kind: CueKind::Line { text },
                    });
                    prev_end = end;
                }
            }
            SubtitleStyle::Progressive => {
                // A word's cue ends when the next word begins; the last
                // word of the scene holds until the scene ends.
                let flat: Vec<(usize, usize)> = lines
                    .iter()
                    .enumerate()
                    .flat_map(|(li, line)| (0..line.len()).map(move |wi| (li, wi)))
                    .collect();

                for (pos, &(li, wi)) in flat.iter().enumerate() {
                    let word = &lines[li][wi];
                    let start = (scene.start_secs + word.start_secs)
                        .clamp(scene.start_secs, scene.end_secs)
                        .max(prev_end);
                    let end = match flat.get(pos + 1) {
                        Some(&(nli, nwi)) => {
                            (scene.start_secs + lines[nli][nwi].start_secs)
                                .clamp(scene.start_secs, scene.end_secs)
                        }
                        None => scene.end_secs,
                    }
                    .max(start);

                    cues.push(SubtitleCue {
                        start_secs: start,
                        end_secs: end,
                        kind: CueKind::Word {
                            line_text: join_words(&lines[li]),
                            word_index: wi,
                        },
                    });
                    prev_end = end;
                }
            }
        }
    }

    if cues.is_empty() {
        tracing::warn!("No cues produced from {} transcript(s)", transcripts.len());
    }

    cues
}

/// Group words into display lines, breaking at word boundaries.
///
/// A new line starts when adding the next word would exceed the
/// character budget or stretch the line past its duration budget.
/// A line never splits a word, so a single oversized word still forms
/// a line of its own.
fn group_lines(words: &[WordSpan]) -> Vec<Vec<WordSpan>> {
    let mut lines: Vec<Vec<WordSpan>> = Vec::new();
    let mut current: Vec<WordSpan> = Vec::new();
    let mut current_chars = 0usize;

    for word in words {
        let added_chars = if current.is_empty() {
            word.word.chars().count()
        } else {
            current_chars + 1 + word.word.chars().count()
        };
        let line_duration = current
            .first()
            .map(|first| word.end_secs - first.start_secs)
            .unwrap_or(0.0);

        let over_budget =
            !current.is_empty() && (added_chars > MAX_LINE_CHARS || line_duration > MAX_LINE_DURATION_SECS);

        if over_budget {
            lines.push(std::mem::take(&mut current));
            current_chars = word.word.chars().count();
        } else {
            current_chars = added_chars;
        }
        current.push(word.clone());
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn join_words(words: &[WordSpan]) -> String {
    words
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{resolve_timing, SourceDurations};
    use scenecast_scene_model::{AudioElement, Element, Scene, VideoConfig};

    fn timing_for(durations: &[(&str, f64)]) -> ResolvedTiming {
        let scenes = durations
            .iter()
            .map(|(id, _)| Scene {
                id: id.to_string(),
                background_color: "transparent".to_string(),
                duration: None,
                elements: vec![Element::Audio(AudioElement {
                    src: format!("{id}.mp3"),
                })],
            })
            .collect();
        let config = VideoConfig {
            comment: None,
            resolution: "custom".to_string(),
            quality: Default::default(),
            width: 1080,
            height: 1920,
            scenes,
            elements: vec![],
        };
        let probed: SourceDurations = durations
            .iter()
            .map(|(id, d)| (format!("{id}.mp3"), *d))
            .collect();
        resolve_timing(&config, &probed).unwrap()
    }

    #[test]
    fn test_progressive_rebase_to_global_timeline() {
        // Words at local (0.0, 0.4) and (0.4, 0.9) in a scene that
        // starts at global offset 5.0.
        let timing = timing_for(&[("first", 5.0), ("second", 1.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "second".to_string(),
            words: vec![
                WordSpan::new("hi", 0.0, 0.4),
                WordSpan::new("there", 0.4, 0.9),
            ],
        }];

        let cues = build_cues(&transcripts, &timing, SubtitleStyle::Progressive);
        assert_eq!(cues.len(), 2);

        assert!((cues[0].start_secs - 5.0).abs() < 1e-9);
        assert!((cues[1].start_secs - 5.4).abs() < 1e-9);

        for (i, cue) in cues.iter().enumerate() {
            match &cue.kind {
                CueKind::Word {
                    line_text,
                    word_index,
                } => {
                    assert_eq!(line_text, "hi there");
                    assert_eq!(*word_index, i);
                }
                other => panic!("expected word cue, got {other:?}"),
            }
        }

        // First cue yields to the second; the last word holds to scene end.
        assert!((cues[0].end_secs - 5.4).abs() < 1e-9);
        assert!((cues[1].end_secs - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_classic_single_line() {
        let timing = timing_for(&[("only", 3.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "only".to_string(),
            words: vec![
                WordSpan::new("short", 0.2, 0.6),
                WordSpan::new("line", 0.6, 1.1),
            ],
        }];

        let cues = build_cues(&transcripts, &timing, SubtitleStyle::Classic);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].line_text(), "short line");
        assert!((cues[0].start_secs - 0.2).abs() < 1e-9);
        assert!((cues[0].end_secs - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_classic_breaks_at_char_budget() {
        let words: Vec<WordSpan> = (0..12)
            .map(|i| {
                WordSpan::new("abcdefgh", i as f64 * 0.3, i as f64 * 0.3 + 0.25)
            })
            .collect();
        let timing = timing_for(&[("s", 5.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "s".to_string(),
            words,
        }];

        let cues = build_cues(&transcripts, &timing, SubtitleStyle::Classic);
        assert!(cues.len() > 1, "12 eight-char words must not fit one line");
        for cue in &cues {
            assert!(cue.line_text().chars().count() <= MAX_LINE_CHARS);
            // words survive intact
            for word in cue.line_text().split(' ') {
                assert_eq!(word, "abcdefgh");
            }
        }
    }

    #[test]
    fn test_classic_breaks_at_duration_budget() {
        // Two short words far apart in time end up on separate lines.
        let timing = timing_for(&[("s", 20.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "s".to_string(),
            words: vec![
                WordSpan::new("first", 0.0, 0.5),
                WordSpan::new("later", 9.0, 9.5),
            ],
        }];

        let cues = build_cues(&transcripts, &timing, SubtitleStyle::Classic);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].line_text(), "first");
        assert_eq!(cues[1].line_text(), "later");
    }

    #[test]
    fn test_oversized_word_forms_own_line() {
        let long = "a".repeat(MAX_LINE_CHARS + 5);
        let timing = timing_for(&[("s", 4.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "s".to_string(),
            words: vec![
                WordSpan::new("intro", 0.0, 0.4),
                WordSpan::new(long.clone(), 0.4, 1.2),
            ],
        }];

        let cues = build_cues(&transcripts, &timing, SubtitleStyle::Classic);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].line_text(), long);
    }

    #[test]
    fn test_cues_clamped_to_scene_window() {
        // Sloppy STT end time past the scene's audio duration.
        let timing = timing_for(&[("s", 2.0), ("next", 1.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "s".to_string(),
            words: vec![WordSpan::new("overrun", 0.5, 7.0)],
        }];

        let cues = build_cues(&transcripts, &timing, SubtitleStyle::Classic);
        assert_eq!(cues.len(), 1);
        assert!(cues[0].end_secs <= 2.0 + 1e-9);
    }

    #[test]
    fn test_unknown_scene_transcript_skipped() {
        let timing = timing_for(&[("known", 2.0)]);
        let transcripts = vec![SceneTranscript {
            scene_id: "phantom".to_string(),
            words: vec![WordSpan::new("lost", 0.0, 1.0)],
        }];
        assert!(build_cues(&transcripts, &timing, SubtitleStyle::Classic).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_words() -> impl Strategy<Value = Vec<WordSpan>> {
            proptest::collection::vec(("[a-z]{1,12}", 0.05f64..1.5), 1..40).prop_map(|raw| {
                let mut t = 0.0f64;
                raw.into_iter()
                    .map(|(word, len)| {
                        let span = WordSpan::new(word, t, t + len);
                        t += len;
                        span
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn cues_are_ordered_and_never_overlap(
                words in arb_words(),
                progressive in proptest::bool::ANY,
            ) {
                let total: f64 = words.last().map(|w| w.end_secs).unwrap_or(1.0);
                let timing = timing_for(&[("lead", 3.0), ("s", total.max(0.1))]);
                let transcripts = vec![SceneTranscript {
                    scene_id: "s".to_string(),
                    words,
                }];
                let style = if progressive {
                    SubtitleStyle::Progressive
                } else {
                    SubtitleStyle::Classic
                };

                let cues = build_cues(&transcripts, &timing, style);
                for pair in cues.windows(2) {
                    prop_assert!(pair[0].end_secs <= pair[1].start_secs + 1e-9);
                    prop_assert!(pair[0].start_secs <= pair[1].start_secs);
                }
                for cue in &cues {
                    prop_assert!(cue.end_secs >= cue.start_secs);
                }
            }
        }
    }
}
