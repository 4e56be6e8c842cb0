//! Bit-exact file naming for segment outputs.
//!
//! Media part: `{base}_part{N}{ext}`; subtitle part:
//! `{base}_part{N}.{lang}.srt`; merged subtitle: `{base}.{lang}.srt`.
//! Part indices are 1-based and contiguous per cut invocation.

/// File name of the media part for segment `index`. `extension` includes
/// the leading dot (e.g. `.mp4`).
pub fn media_part_name(base_name: &str, index: usize, extension: &str) -> String {
    format!("{}_part{}{}", base_name, index, extension)
}

/// File name of the per-segment subtitle for one language.
pub fn subtitle_part_name(base_name: &str, index: usize, language: &str) -> String {
    format!("{}_part{}.{}.srt", base_name, index, language)
}

/// File name of the final merged subtitle for one language.
pub fn merged_subtitle_name(base_name: &str, language: &str) -> String {
    format!("{}.{}.srt", base_name, language)
}

/// A parsed `{base}_part{N}...` file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartName {
    pub index: usize,
    /// Everything after the index, leading dot included (e.g. `.mp4`,
    /// `.en.srt`, `.txt`).
    pub suffix: String,
}

impl PartName {
    /// Subtitle and plain-text files are companions of a media part; any
    /// other suffix is the media part itself.
    pub fn is_companion(&self) -> bool {
        self.suffix.ends_with(".srt") || self.suffix.ends_with(".txt")
    }

    /// Language code of a `.{lang}.srt` companion, if this is one.
    pub fn subtitle_language(&self) -> Option<&str> {
        let middle = self.suffix.strip_suffix(".srt")?.strip_prefix('.')?;
        if middle.is_empty() || middle.contains('.') {
            return None;
        }
        Some(middle)
    }
}

/// Parse a file name against the `{base}_part{N}` convention. Returns
/// `None` for files that do not belong to `base_name`.
pub fn parse_part_name(file_name: &str, base_name: &str) -> Option<PartName> {
    let rest = file_name.strip_prefix(base_name)?.strip_prefix("_part")?;
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let index = rest[..digits_end].parse::<usize>().ok()?;
    let suffix = &rest[digits_end..];
    if !suffix.starts_with('.') {
        return None;
    }
    Some(PartName {
        index,
        suffix: suffix.to_string(),
    })
}
