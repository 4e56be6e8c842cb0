use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::Result;
use crate::naming::parse_part_name;
use crate::scan::DirectoryScanner;

/// Per-language report of which segment indices lack a subtitle part file.
/// An empty missing list means the language is complete. Pure function of
/// the directory listing; nothing is mutated.
pub type LanguageCompleteness = BTreeMap<String, Vec<usize>>;

/// Scan `{base}_part*.{lang}.srt` files and report, per discovered
/// language, the indices in `1..=segment_count` without a subtitle part.
pub fn analyze_completeness(
    scanner: &dyn DirectoryScanner,
    dir: &Path,
    base_name: &str,
    segment_count: usize,
) -> Result<LanguageCompleteness> {
    let mut present: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
    for name in scanner.list_file_names(dir)? {
        let Some(part) = parse_part_name(&name, base_name) else {
            continue;
        };
        if let Some(language) = part.subtitle_language() {
            present.entry(language.to_string()).or_default().insert(part.index);
        }
    }

    let report = present
        .into_iter()
        .map(|(language, indices)| {
            let missing = (1..=segment_count).filter(|i| !indices.contains(i)).collect();
            (language, missing)
        })
        .collect();
    Ok(report)
}

/// Count the media part files of `base_name` in `dir`, in other words the
/// segment count of the most recent cut. Companions do not count.
pub fn count_media_parts(
    scanner: &dyn DirectoryScanner,
    dir: &Path,
    base_name: &str,
) -> Result<usize> {
    let mut indices = BTreeSet::new();
    for name in scanner.list_file_names(dir)? {
        if let Some(part) = parse_part_name(&name, base_name) {
            if !part.is_companion() {
                indices.insert(part.index);
            }
        }
    }
    Ok(indices.len())
}
