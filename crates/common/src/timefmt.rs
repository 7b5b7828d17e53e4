//! Timestamp formatting for subtitle documents.
//!
//! ASS dialogue lines use `H:MM:SS.cc` (centiseconds). The format is
//! derived from a total-centisecond decomposition so negative inputs
//! never panic.

/// Format seconds as an ASS timestamp: `H:MM:SS.cc`.
pub fn format_ass_time(secs: f64) -> String {
    let total_cs = (secs.max(0.0) * 100.0).round() as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let seconds = (total_cs % 6_000) / 100;
    let centis = total_cs % 100;
    format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ass_time_formatting() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(5.4), "0:00:05.40");
        assert_eq!(format_ass_time(61.25), "0:01:01.25");
        assert_eq!(format_ass_time(3661.5), "1:01:01.50");
    }

    #[test]
    fn test_negative_input_clamps_to_zero() {
        assert_eq!(format_ass_time(-1.0), "0:00:00.00");
    }
}
