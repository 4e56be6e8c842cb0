use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::completeness::{LanguageCompleteness, analyze_completeness, count_media_parts};
use crate::config::Config;
use crate::confirm::ConfirmationGate;
use crate::error::{KiremeError, Result};
use crate::media::{CuttingTool, MediaProber, MediaToolFactory};
use crate::merge::{MergeStatus, duplicate_merged, merge_language};
use crate::naming::parse_part_name;
use crate::reconcile::{execute_deletes, plan_reconciliation};
use crate::scan::{DirectoryScanner, FsScanner};
use crate::segment::{Segment, plan_segments};

/// Consolidated result of one cut invocation. The new/deleted lists are
/// what a playlist store consumer needs to update its channel list.
#[derive(Debug, Clone, Default)]
pub struct CutOutcome {
    pub segments: Vec<Segment>,
    pub new_files: Vec<PathBuf>,
    pub deleted_files: Vec<PathBuf>,
    pub failed_deletes: Vec<PathBuf>,
}

/// Consolidated result of one merge invocation. Per-language failures are
/// aggregated here; partial success is never reported as total success.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub results: Vec<(String, MergeStatus)>,
    /// Result of the optional `auto` duplicate, tracked separately.
    pub duplicate: Option<(String, MergeStatus)>,
    pub completeness: LanguageCompleteness,
}

impl MergeReport {
    pub fn succeeded(&self) -> usize {
        self.all_results()
            .filter(|(_, s)| matches!(s, MergeStatus::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.all_results()
            .filter(|(_, s)| matches!(s, MergeStatus::Failed { .. }))
            .count()
    }

    fn all_results(&self) -> impl Iterator<Item = &(String, MergeStatus)> {
        self.results.iter().chain(self.duplicate.as_ref())
    }
}

pub struct Workflow {
    config: Config,
    prober: Box<dyn MediaProber>,
    cutter: Box<dyn CuttingTool>,
    scanner: Box<dyn DirectoryScanner>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let prober = MediaToolFactory::create_prober(config.media.clone());
        let cutter = MediaToolFactory::create_cutter(config.media.clone());

        // Check dependencies
        prober.check_availability()?;
        cutter.check_availability()?;

        Ok(Self {
            config,
            prober,
            cutter,
            scanner: Box::new(FsScanner),
        })
    }

    /// Construction with injected collaborators; used by tests.
    pub fn with_tools(
        config: Config,
        prober: Box<dyn MediaProber>,
        cutter: Box<dyn CuttingTool>,
        scanner: Box<dyn DirectoryScanner>,
    ) -> Self {
        Self {
            config,
            prober,
            cutter,
            scanner,
        }
    }

    /// Plan segments for a source file without touching the filesystem.
    pub async fn plan(&self, source: &Path, cut_points: &[f64]) -> Result<Vec<Segment>> {
        let media_info = self.prober.probe(source).await?;
        plan_segments(cut_points, media_info.duration_seconds)
    }

    /// One cut invocation: plan segments, reconcile previously generated
    /// part files, delete confirmed orphans, then cut.
    ///
    /// A declined confirmation ends the invocation before any side effect.
    /// Orphan deletion is best-effort; per-file failures are logged and
    /// reported, not fatal.
    pub async fn cut(
        &self,
        source: &Path,
        base_name: &str,
        cut_points: &[f64],
        gate: &dyn ConfirmationGate,
    ) -> Result<CutOutcome> {
        if !source.exists() {
            return Err(KiremeError::FileNotFound(source.display().to_string()));
        }
        let dir = source
            .parent()
            .ok_or_else(|| KiremeError::Config("Cannot determine output directory".to_string()))?;
        let options = self.config.options_for(base_name)?;

        let segments = self.plan(source, cut_points).await?;
        info!("Planned {} segments for {}", segments.len(), base_name);

        let plan = plan_reconciliation(
            self.scanner.as_ref(),
            dir,
            base_name,
            &options.extension,
            segments.len(),
        )?;

        if plan.has_orphans()
            && !gate.confirm(&format!(
                "Delete {} orphan part file(s) from earlier cuts?",
                plan.orphan_delete.len()
            ))
        {
            return Err(KiremeError::Cancelled);
        }
        if !plan.overwrite.is_empty()
            && !gate.confirm(&format!(
                "Overwrite {} existing part file(s)?",
                plan.overwrite.len()
            ))
        {
            return Err(KiremeError::Cancelled);
        }

        let delete_outcome = execute_deletes(&plan).await;
        for failed in &delete_outcome.failed {
            warn!("Orphan left behind: {}", failed.display());
        }

        let new_files = self
            .cutter
            .cut(source, dir, base_name, &options.extension, &segments)
            .await?;

        Ok(CutOutcome {
            segments,
            new_files,
            deleted_files: delete_outcome.deleted,
            failed_deletes: delete_outcome.failed,
        })
    }

    /// Which languages have subtitle parts, and which segment indices they
    /// are missing. Pure read.
    pub fn completeness(&self, dir: &Path, base_name: &str) -> Result<LanguageCompleteness> {
        let segment_count = count_media_parts(self.scanner.as_ref(), dir, base_name)?;
        analyze_completeness(self.scanner.as_ref(), dir, base_name, segment_count)
    }

    /// One merge invocation over the requested languages (or the configured
    /// ones when `languages` is empty).
    ///
    /// Per-language failures are collected and do not stop the other
    /// languages; only a probe failure or a declined confirmation aborts
    /// the invocation.
    pub async fn merge(
        &self,
        dir: &Path,
        base_name: &str,
        languages: &[String],
        gate: &dyn ConfirmationGate,
    ) -> Result<MergeReport> {
        let options = self.config.options_for(base_name)?;
        let media_parts = self.ordered_media_parts(dir, base_name)?;
        if media_parts.is_empty() {
            return Err(KiremeError::Validation(format!(
                "No part files found for '{}' in {}",
                base_name,
                dir.display()
            )));
        }

        let completeness =
            analyze_completeness(self.scanner.as_ref(), dir, base_name, media_parts.len())?;

        let requested: Vec<String> = if languages.is_empty() {
            options.languages.clone()
        } else {
            languages.to_vec()
        };

        let mut report = MergeReport {
            completeness,
            ..Default::default()
        };

        for language in &requested {
            let status = merge_language(
                self.prober.as_ref(),
                gate,
                dir,
                base_name,
                language,
                &media_parts,
            )
            .await?;

            if let MergeStatus::Failed { reason } = &status {
                warn!("Merge failed for '{}': {}", language, reason);
            }

            let merged_auto_ok =
                language == "auto" && matches!(status, MergeStatus::Succeeded { .. });
            report.results.push((language.clone(), status));

            if merged_auto_ok {
                if let Some(target) = &options.auto_save_language {
                    let duplicate_status =
                        duplicate_merged(gate, dir, base_name, "auto", target).await?;
                    report.duplicate = Some((target.clone(), duplicate_status));
                }
            }
        }

        info!(
            "Merge invocation for '{}' finished: {} succeeded, {} failed",
            base_name,
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    /// Media part files of `base_name` in segment order.
    fn ordered_media_parts(&self, dir: &Path, base_name: &str) -> Result<Vec<PathBuf>> {
        let mut indexed: Vec<(usize, String)> = Vec::new();
        for name in self.scanner.list_file_names(dir)? {
            if let Some(part) = parse_part_name(&name, base_name) {
                if !part.is_companion() {
                    indexed.push((part.index, name));
                }
            }
        }
        indexed.sort();
        Ok(indexed.into_iter().map(|(_, name)| dir.join(name)).collect())
    }
}
