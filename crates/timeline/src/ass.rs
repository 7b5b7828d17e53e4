//! Advanced SubStation Alpha (ASS) rendering of a cue track.
//!
//! Produces the document handed to the encoder's `ass=` filter: a
//! `[Script Info]` block, one `Default` style derived from the subtitle
//! settings, and one `Dialogue` event per cue. Progressive cues redraw
//! the whole line with a color override around the highlighted word.

use scenecast_common::format_ass_time;
use scenecast_scene_model::SubtitleSettings;

use crate::cues::{CueKind, SubtitleCue};

/// Render a complete ASS document for a cue track.
pub fn render_ass(cues: &[SubtitleCue], settings: &SubtitleSettings) -> String {
    let mut doc = header(settings);
    for cue in cues {
        doc.push_str(&dialogue_line(cue, settings));
    }
    doc
}

fn header(settings: &SubtitleSettings) -> String {
    let word_color = ass_color(&settings.word_color);
    let line_color = ass_color(&settings.line_color);
    let outline_color = ass_color(&settings.outline_color);
    let box_color = ass_color(&settings.box_color);
    let alignment = settings.position.ass_alignment();

    format!(
        "[Script Info]\n\
         Title: Generated Subtitles\n\
         ScriptType: v4.00+\n\
         WrapStyle: 0\n\
         ScaledBorderAndShadow: yes\n\
         YCbCr Matrix: TV.709\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,{font},{size},{word_color},{line_color},{outline_color},{box_color},1,0,0,0,100,100,0,0,1,{outline},{shadow},{alignment},10,10,20,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        font = settings.font_family,
        size = settings.font_size,
        outline = settings.outline_width,
        shadow = settings.shadow_offset,
    )
}

fn dialogue_line(cue: &SubtitleCue, settings: &SubtitleSettings) -> String {
    let start = format_ass_time(cue.start_secs);
    let end = format_ass_time(cue.end_secs);
    let text = match &cue.kind {
        CueKind::Line { text } => escape_ass_text(text),
        CueKind::Word {
            line_text,
            word_index,
        } => highlight_word(line_text, *word_index, settings),
    };
    format!("Dialogue: 0,{start},{end},Default,,0,0,0,,{text}\n")
}

/// Rebuild the line with the highlighted word wrapped in a `\c` color
/// override, restoring the line color afterwards.
fn highlight_word(line_text: &str, word_index: usize, settings: &SubtitleSettings) -> String {
    let word_color = ass_color(&settings.word_color);
    let line_color = ass_color(&settings.line_color);

    let parts: Vec<String> = line_text
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let escaped = escape_ass_text(word);
            if i == word_index {
                format!("{{\\c{word_color}&}}{escaped}{{\\c{line_color}&}}")
            } else {
                escaped
            }
        })
        .collect();
    parts.join(" ")
}

/// Convert `#RRGGBB` to the ASS `&HBBGGRR` form, falling back to white
/// on malformed input.
fn ass_color(hex: &str) -> String {
    let stripped = hex.strip_prefix('#').unwrap_or(hex);
    if stripped.len() == 6 && stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        let r = &stripped[0..2];
        let g = &stripped[2..4];
        let b = &stripped[4..6];
        format!("&H00{}{}{}", b.to_uppercase(), g.to_uppercase(), r.to_uppercase())
    } else {
        tracing::warn!(color = hex, "Invalid color, using white");
        "&H00FFFFFF".to_string()
    }
}

/// Escape text for an ASS dialogue field and collapse whitespace runs.
fn escape_ass_text(text: &str) -> String {
    let escaped = text
        .replace('\n', "\\N")
        .replace('{', "\\{")
        .replace('}', "\\}");
    escaped.split_whitespace().collect::<Vec<_>>().join(" ")
}
