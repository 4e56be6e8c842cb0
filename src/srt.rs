use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::timecode::{format_srt_time, parse_srt_time};

/// One subtitle entry: a time range plus its text.
///
/// Sequence numbers are not stored; they are reassigned on serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleBlock {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SubtitleBlock {
    /// Shift both timestamps forward by `offset` seconds.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            text: self.text.clone(),
        }
    }
}

/// Parse SubRip content into blocks.
///
/// Each block is a sequence-number line, a `<start> --> <end>` line (comma or
/// dot millisecond separator accepted), one or more text lines, terminated by
/// a blank line or end of input. Blocks whose trimmed text is empty are
/// dropped. Content that yields no blocks at all is not an error here; the
/// caller treats an empty list the same as a missing file.
pub fn parse_blocks(content: &str) -> Vec<SubtitleBlock> {
    let mut blocks = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Sequence number line; a bare timing line is tolerated as well.
        let timing_line = if line.contains("-->") {
            line.to_string()
        } else {
            if line.parse::<u64>().is_err() {
                continue;
            }
            match lines.next() {
                Some(next) => next.trim().to_string(),
                None => break,
            }
        };

        let Some((start_text, end_text)) = timing_line.split_once("-->") else {
            continue;
        };
        let (Ok(start), Ok(end)) = (parse_srt_time(start_text), parse_srt_time(end_text)) else {
            debug!("Skipping block with malformed timing line: '{}'", timing_line);
            continue;
        };

        let mut text_lines = Vec::new();
        while let Some(text_line) = lines.next_if(|l| !l.trim().is_empty()) {
            text_lines.push(text_line.trim().to_string());
        }

        let text = text_lines.join("\n");
        if text.trim().is_empty() {
            continue;
        }

        blocks.push(SubtitleBlock { start, end, text });
    }

    blocks
}

/// Read and parse a subtitle file.
///
/// An unreadable or unparseable file yields an empty block list, identically
/// to an absent file; partial language sets are allowed by design.
pub async fn read_blocks(path: &Path) -> Vec<SubtitleBlock> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_blocks(&content),
        Err(e) => {
            debug!("Treating {} as empty: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Serialize blocks as SubRip, re-indexing sequentially from 1.
pub fn serialize_blocks(blocks: &[SubtitleBlock]) -> String {
    let mut content = String::new();
    for (index, block) in blocks.iter().enumerate() {
        content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(block.start),
            format_srt_time(block.end),
            block.text.trim()
        ));
    }
    content
}

/// Write blocks to an SRT file, overwriting any existing content.
pub async fn write_blocks(path: &Path, blocks: &[SubtitleBlock]) -> Result<()> {
    tokio::fs::write(path, serialize_blocks(blocks)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_file() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n2\n00:00:03,000 --> 00:00:04,500\nBye\nnow\n\n";
        let blocks = parse_blocks(content);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start, 1.0);
        assert_eq!(blocks[0].text, "Hi");
        assert_eq!(blocks[1].text, "Bye\nnow");
        assert_eq!(blocks[1].end, 4.5);
    }

    #[test]
    fn test_parse_accepts_dot_separator() {
        let blocks = parse_blocks("1\n00:00:00.500 --> 00:00:01.000\nBye\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, 0.5);
    }

    #[test]
    fn test_empty_text_blocks_dropped() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\n   \n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n";
        let blocks = parse_blocks(content);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Kept");
    }

    #[test]
    fn test_garbage_yields_empty_list() {
        assert!(parse_blocks("not a subtitle file\nat all\n").is_empty());
        assert!(parse_blocks("").is_empty());
    }

    #[test]
    fn test_round_trip_within_millisecond() {
        let blocks = vec![
            SubtitleBlock { start: 1.0, end: 2.0, text: "Hi".to_string() },
            SubtitleBlock { start: 30.5, end: 31.0, text: "Bye".to_string() },
        ];
        let parsed = parse_blocks(&serialize_blocks(&blocks));
        assert_eq!(parsed.len(), blocks.len());
        for (original, round_tripped) in blocks.iter().zip(&parsed) {
            assert!((original.start - round_tripped.start).abs() < 0.001);
            assert!((original.end - round_tripped.end).abs() < 0.001);
            assert_eq!(original.text, round_tripped.text);
        }
    }

    #[test]
    fn test_serializer_reindexes_from_one() {
        let blocks = vec![
            SubtitleBlock { start: 0.0, end: 1.0, text: "a".to_string() },
            SubtitleBlock { start: 2.0, end: 3.0, text: "b".to_string() },
        ];
        let content = serialize_blocks(&blocks);
        assert!(content.starts_with("1\n"));
        assert!(content.contains("\n\n2\n"));
        assert!(content.contains("00:00:00,000 --> 00:00:01,000"));
    }

    #[test]
    fn test_shifted() {
        let block = SubtitleBlock { start: 0.5, end: 1.0, text: "x".to_string() };
        let shifted = block.shifted(30.0);
        assert_eq!(shifted.start, 30.5);
        assert_eq!(shifted.end, 31.0);
    }
}
