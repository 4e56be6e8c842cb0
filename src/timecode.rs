use crate::error::{KiremeError, Result};

/// Parse a SubRip timecode (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) into seconds.
///
/// Exactly four numeric groups must be present; anything else is a format error.
pub fn parse_srt_time(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let (clock, millis_part) = trimmed
        .rsplit_once([',', '.'])
        .ok_or_else(|| KiremeError::Timecode(format!("Invalid timecode: '{}'", trimmed)))?;

    let mut clock_parts = clock.split(':');
    let (hours, minutes, seconds) = match (clock_parts.next(), clock_parts.next(), clock_parts.next(), clock_parts.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(KiremeError::Timecode(format!("Invalid timecode: '{}'", trimmed))),
    };

    let parse_group = |group: &str| -> Result<u64> {
        if group.is_empty() || !group.chars().all(|c| c.is_ascii_digit()) {
            return Err(KiremeError::Timecode(format!(
                "Invalid timecode group '{}' in '{}'",
                group, trimmed
            )));
        }
        group
            .parse::<u64>()
            .map_err(|e| KiremeError::Timecode(format!("Invalid timecode '{}': {}", trimmed, e)))
    };

    let hours = parse_group(hours)?;
    let minutes = parse_group(minutes)?;
    let seconds = parse_group(seconds)?;
    let millis = parse_group(millis_part)?;

    let total_millis = hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis;
    Ok(total_millis as f64 / 1000.0)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm).
///
/// Negative durations are clamped to zero; milliseconds are always comma-separated.
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_format_clamps_negative() {
        assert_eq!(format_srt_time(-3.25), "00:00:00,000");
    }

    #[test]
    fn test_parse_comma_and_dot_separators() {
        assert_eq!(parse_srt_time("00:00:01,000").unwrap(), 1.0);
        assert_eq!(parse_srt_time("00:00:01.500").unwrap(), 1.5);
        assert_eq!(parse_srt_time("01:01:01,500").unwrap(), 3661.5);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_srt_time("00:00:01").is_err());
        assert!(parse_srt_time("00:01,000").is_err());
        assert!(parse_srt_time("00:00:aa,000").is_err());
        assert!(parse_srt_time("00:00:00:01,000").is_err());
        assert!(parse_srt_time("").is_err());
    }

    #[test]
    fn test_round_trip() {
        for text in ["00:00:00,000", "00:01:05,123", "12:34:56,789"] {
            let seconds = parse_srt_time(text).unwrap();
            assert_eq!(format_srt_time(seconds), text);
        }
    }
}
