use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::confirm::ConfirmationGate;
use crate::error::Result;
use crate::media::MediaProber;
use crate::naming::{merged_subtitle_name, subtitle_part_name};
use crate::srt;

/// Result of one language's merge. Probe failures and declined
/// confirmations are not statuses; they abort the invocation as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    Succeeded { output: PathBuf },
    Failed { reason: String },
}

/// Merge the per-segment subtitle files of one language into a single
/// time-shifted `{base}.{lang}.srt`.
///
/// `media_parts` are the segment media files in segment order; each is
/// probed for its duration to build cumulative offsets. Missing or
/// unparseable subtitle parts are skipped (partial language sets are
/// allowed by design). Zero merged blocks across all segments is a
/// per-language failure, not an invocation error.
pub async fn merge_language(
    prober: &dyn MediaProber,
    gate: &dyn ConfirmationGate,
    dir: &Path,
    base_name: &str,
    language: &str,
    media_parts: &[PathBuf],
) -> Result<MergeStatus> {
    info!(
        "Merging '{}' subtitles for {} ({} segments)",
        language,
        base_name,
        media_parts.len()
    );

    // Cumulative start offset of each segment within the full timeline.
    // Any probe failure is fatal to the whole merge invocation.
    let mut offsets = Vec::with_capacity(media_parts.len());
    let mut elapsed = 0.0_f64;
    for part in media_parts {
        offsets.push(elapsed);
        let media_info = prober.probe(part).await?;
        elapsed += media_info.duration_seconds;
    }

    let mut blocks = Vec::new();
    for (i, offset) in offsets.iter().enumerate() {
        let part_path = dir.join(subtitle_part_name(base_name, i + 1, language));
        let parsed = srt::read_blocks(&part_path).await;
        if parsed.is_empty() {
            debug!("No '{}' subtitles for segment {}", language, i + 1);
            continue;
        }
        blocks.extend(parsed.iter().map(|block| block.shifted(*offset)));
    }

    if blocks.is_empty() {
        return Ok(MergeStatus::Failed {
            reason: format!("No subtitle blocks found for language '{}'", language),
        });
    }

    blocks.sort_by(|a, b| a.start.total_cmp(&b.start));

    let output = dir.join(merged_subtitle_name(base_name, language));
    if output.exists()
        && !gate.confirm(&format!("Overwrite existing file {}?", output.display()))
    {
        return Err(crate::error::KiremeError::Cancelled);
    }

    srt::write_blocks(&output, &blocks).await?;
    info!("Merged {} blocks into {}", blocks.len(), output.display());

    Ok(MergeStatus::Succeeded { output })
}

/// Save an additional, independent copy of a merged `auto` subtitle under a
/// user-supplied language code. Plain duplication, tracked separately from
/// the primary merge.
pub async fn duplicate_merged(
    gate: &dyn ConfirmationGate,
    dir: &Path,
    base_name: &str,
    source_language: &str,
    target_language: &str,
) -> Result<MergeStatus> {
    let source = dir.join(merged_subtitle_name(base_name, source_language));
    let target = dir.join(merged_subtitle_name(base_name, target_language));

    if !source.exists() {
        return Ok(MergeStatus::Failed {
            reason: format!("Source file {} does not exist", source.display()),
        });
    }
    if target.exists()
        && !gate.confirm(&format!("Overwrite existing file {}?", target.display()))
    {
        return Err(crate::error::KiremeError::Cancelled);
    }

    tokio::fs::copy(&source, &target).await?;
    info!("Duplicated {} as {}", source.display(), target.display());
    Ok(MergeStatus::Succeeded { output: target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AnswerAll;
    use crate::error::KiremeError;
    use crate::media::{MediaInfo, MockMediaProber};

    fn prober_with_durations(durations: &'static [(&'static str, f64)]) -> MockMediaProber {
        let mut prober = MockMediaProber::new();
        prober.expect_probe().returning(move |path| {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let duration = durations
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, d)| *d)
                .unwrap();
            Ok(MediaInfo {
                duration_seconds: duration,
                is_video: true,
                frame_rate: Some(25.0),
            })
        });
        prober
    }

    fn part_paths(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count).map(|i| dir.join(format!("talk_part{}.mp4", i))).collect()
    }

    #[tokio::test]
    async fn test_partial_language_merge_shifts_by_cumulative_offset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("talk_part1.en.srt"),
            "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n",
        )
        .unwrap();
        // part2 subtitle deliberately absent
        std::fs::write(
            dir.path().join("talk_part3.en.srt"),
            "1\n00:00:00,500 --> 00:00:01,000\nBye\n\n",
        )
        .unwrap();

        let prober = prober_with_durations(&[
            ("talk_part1.mp4", 10.0),
            ("talk_part2.mp4", 8.0),
            ("talk_part3.mp4", 12.0),
        ]);

        let status = merge_language(
            &prober,
            &AnswerAll(true),
            dir.path(),
            "talk",
            "en",
            &part_paths(dir.path(), 3),
        )
        .await
        .unwrap();

        let output = match status {
            MergeStatus::Succeeded { output } => output,
            other => panic!("Unexpected status: {:?}", other),
        };
        let merged = srt::parse_blocks(&std::fs::read_to_string(output).unwrap());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "Hi");
        assert!((merged[0].start - 1.0).abs() < 0.001);
        assert!((merged[0].end - 2.0).abs() < 0.001);
        // Part 3 starts after 10s + 8s of preceding media.
        assert_eq!(merged[1].text, "Bye");
        assert!((merged[1].start - 18.5).abs() < 0.001);
        assert!((merged[1].end - 19.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_zero_blocks_is_language_failure() {
        let dir = tempfile::tempdir().unwrap();
        let prober = prober_with_durations(&[("talk_part1.mp4", 10.0)]);

        let status = merge_language(
            &prober,
            &AnswerAll(true),
            dir.path(),
            "talk",
            "fr",
            &part_paths(dir.path(), 1),
        )
        .await
        .unwrap();

        assert!(matches!(status, MergeStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_probe_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut prober = MockMediaProber::new();
        prober
            .expect_probe()
            .returning(|_| Err(KiremeError::Probe("ffprobe missing".to_string())));

        let result = merge_language(
            &prober,
            &AnswerAll(true),
            dir.path(),
            "talk",
            "en",
            &part_paths(dir.path(), 1),
        )
        .await;

        assert!(matches!(result, Err(KiremeError::Probe(_))));
    }

    #[tokio::test]
    async fn test_declined_overwrite_cancels_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("talk_part1.en.srt"),
            "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n",
        )
        .unwrap();
        let existing = dir.path().join("talk.en.srt");
        std::fs::write(&existing, "previous content").unwrap();

        let prober = prober_with_durations(&[("talk_part1.mp4", 10.0)]);

        let result = merge_language(
            &prober,
            &AnswerAll(false),
            dir.path(),
            "talk",
            "en",
            &part_paths(dir.path(), 1),
        )
        .await;

        assert!(matches!(result, Err(KiremeError::Cancelled)));
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "previous content");
    }

    #[tokio::test]
    async fn test_blocks_sorted_across_segments() {
        let dir = tempfile::tempdir().unwrap();
        // Second segment's block lands before the tail block of the first.
        std::fs::write(
            dir.path().join("talk_part1.en.srt"),
            "1\n00:00:00,000 --> 00:00:01,000\nfirst\n\n2\n00:00:09,000 --> 00:00:11,000\noverhang\n\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("talk_part2.en.srt"),
            "1\n00:00:00,000 --> 00:00:00,800\nsecond\n\n",
        )
        .unwrap();

        let prober =
            prober_with_durations(&[("talk_part1.mp4", 9.5), ("talk_part2.mp4", 5.0)]);

        let status = merge_language(
            &prober,
            &AnswerAll(true),
            dir.path(),
            "talk",
            "en",
            &part_paths(dir.path(), 2),
        )
        .await
        .unwrap();

        let output = match status {
            MergeStatus::Succeeded { output } => output,
            other => panic!("Unexpected status: {:?}", other),
        };
        let merged = srt::parse_blocks(&std::fs::read_to_string(output).unwrap());
        let texts: Vec<&str> = merged.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "overhang", "second"]);
        assert!(merged.windows(2).all(|pair| pair[0].start <= pair[1].start));
    }

    #[tokio::test]
    async fn test_duplicate_merged_copies_independently() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("talk.auto.srt"), "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n")
            .unwrap();

        let status = duplicate_merged(&AnswerAll(true), dir.path(), "talk", "auto", "en")
            .await
            .unwrap();

        assert_eq!(
            status,
            MergeStatus::Succeeded { output: dir.path().join("talk.en.srt") }
        );
        assert!(dir.path().join("talk.auto.srt").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("talk.en.srt")).unwrap(),
            std::fs::read_to_string(dir.path().join("talk.auto.srt")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_duplicate_missing_source_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let status = duplicate_merged(&AnswerAll(true), dir.path(), "talk", "auto", "en")
            .await
            .unwrap();
        assert!(matches!(status, MergeStatus::Failed { .. }));
    }
}
