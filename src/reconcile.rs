use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::naming::{media_part_name, parse_part_name};
use crate::scan::DirectoryScanner;

/// Classification of existing generated files against a new segment plan.
///
/// The three sets are disjoint. Computing a plan has no side effects and is
/// idempotent for an unchanged directory; deletion is a separate,
/// confirmation-gated step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Existing media part files that coincide with a proposed new output.
    pub overwrite: BTreeSet<PathBuf>,
    /// Part files (media and their subtitle/text companions) with no
    /// counterpart in the new plan.
    pub orphan_delete: BTreeSet<PathBuf>,
    /// Remaining part files, left alone.
    pub untouched: BTreeSet<PathBuf>,
}

impl ReconciliationPlan {
    pub fn has_orphans(&self) -> bool {
        !self.orphan_delete.is_empty()
    }
}

/// Outcome of the gated delete step. Failures are per-file and best-effort.
#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Classify the part files of `base_name` in `dir` against the proposed
/// outputs `{base}_part{i}{ext}` for `i` in `1..=segment_count`.
pub fn plan_reconciliation(
    scanner: &dyn DirectoryScanner,
    dir: &Path,
    base_name: &str,
    extension: &str,
    segment_count: usize,
) -> Result<ReconciliationPlan> {
    let proposed: BTreeSet<String> = (1..=segment_count)
        .map(|i| media_part_name(base_name, i, extension))
        .collect();

    // Group everything sharing a {base}_part{i} prefix, media and
    // companions separately.
    let mut media_by_index: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut companions_by_index: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for name in scanner.list_file_names(dir)? {
        let Some(part) = parse_part_name(&name, base_name) else {
            continue;
        };
        if part.is_companion() {
            companions_by_index.entry(part.index).or_default().push(name);
        } else {
            media_by_index.entry(part.index).or_default().push(name);
        }
    }

    let mut plan = ReconciliationPlan::default();
    let mut orphan_indices: BTreeSet<usize> = BTreeSet::new();

    for (index, names) in &media_by_index {
        for name in names {
            if proposed.contains(name) {
                plan.overwrite.insert(dir.join(name));
            } else {
                plan.orphan_delete.insert(dir.join(name));
                orphan_indices.insert(*index);
            }
        }
    }

    for (index, names) in &companions_by_index {
        for name in names {
            if orphan_indices.contains(index) {
                plan.orphan_delete.insert(dir.join(name));
            } else {
                plan.untouched.insert(dir.join(name));
            }
        }
    }

    Ok(plan)
}

/// Delete the orphan files of a plan. Only call after explicit external
/// confirmation. A failure on one file is logged and the rest of the batch
/// continues.
pub async fn execute_deletes(plan: &ReconciliationPlan) -> DeleteOutcome {
    let mut outcome = DeleteOutcome::default();
    for path in &plan.orphan_delete {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!("Deleted orphan file: {}", path.display());
                outcome.deleted.push(path.clone());
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", path.display(), e);
                outcome.failed.push(path.clone());
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::MemoryScanner;

    fn paths(dir: &Path, names: &[&str]) -> BTreeSet<PathBuf> {
        names.iter().map(|n| dir.join(n)).collect()
    }

    #[test]
    fn test_classification_is_disjoint_and_complete() {
        let dir = Path::new("/media");
        let scanner = MemoryScanner::new([
            "talk_part1.mp4",
            "talk_part1.en.srt",
            "talk_part2.mp4",
            "talk_part3.mp4",
            "talk_part3.es.srt",
            "talk_part3.txt",
            "unrelated.mp4",
        ]);

        let plan = plan_reconciliation(&scanner, dir, "talk", ".mp4", 2).unwrap();

        assert_eq!(plan.overwrite, paths(dir, &["talk_part1.mp4", "talk_part2.mp4"]));
        assert_eq!(
            plan.orphan_delete,
            paths(dir, &["talk_part3.mp4", "talk_part3.es.srt", "talk_part3.txt"])
        );
        assert_eq!(plan.untouched, paths(dir, &["talk_part1.en.srt"]));
    }

    #[test]
    fn test_extension_change_orphans_old_media() {
        let dir = Path::new("/media");
        let scanner = MemoryScanner::new(["talk_part1.mkv", "talk_part1.en.srt"]);

        let plan = plan_reconciliation(&scanner, dir, "talk", ".mp4", 1).unwrap();

        // Old media is an orphan, and its subtitle companion goes with it.
        assert_eq!(
            plan.orphan_delete,
            paths(dir, &["talk_part1.mkv", "talk_part1.en.srt"])
        );
        assert!(plan.overwrite.is_empty());
    }

    #[test]
    fn test_idempotent_for_unchanged_listing() {
        let dir = Path::new("/media");
        let scanner = MemoryScanner::new(["talk_part1.mp4", "talk_part2.mp4", "talk_part2.en.srt"]);

        let first = plan_reconciliation(&scanner, dir, "talk", ".mp4", 1).unwrap();
        let second = plan_reconciliation(&scanner, dir, "talk", ".mp4", 1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_directory_yields_empty_plan() {
        let plan = plan_reconciliation(
            &MemoryScanner::default(),
            Path::new("/media"),
            "talk",
            ".mp4",
            3,
        )
        .unwrap();
        assert!(!plan.has_orphans());
        assert!(plan.overwrite.is_empty());
        assert!(plan.untouched.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("talk_part9.mp4");
        std::fs::write(&existing, b"x").unwrap();
        let missing = dir.path().join("talk_part8.mp4");

        let mut plan = ReconciliationPlan::default();
        plan.orphan_delete.insert(existing.clone());
        plan.orphan_delete.insert(missing.clone());

        let outcome = execute_deletes(&plan).await;
        assert_eq!(outcome.deleted, vec![existing.clone()]);
        assert_eq!(outcome.failed, vec![missing]);
        assert!(!existing.exists());
    }
}
