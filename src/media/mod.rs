// Modular media tooling architecture
//
// External binaries are collaborators behind traits:
// - MediaProber: duration/stream inspection (ffprobe)
// - CuttingTool: lossless per-segment stream copy (ffmpeg)

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::segment::Segment;

/// Stream facts reported by the prober.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub is_video: bool,
    pub frame_rate: Option<f64>,
}

/// Media inspection. A probe failure is fatal to any operation that needs
/// the duration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;

    /// Check if the prober binary is available
    fn check_availability(&self) -> Result<()>;
}

/// Per-segment lossless cutting. Produces exactly one output per segment,
/// named `{base}_part{i}{ext}` with 1-based contiguous indices; the first
/// failure aborts creation of the remaining segments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CuttingTool: Send + Sync {
    async fn cut(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
        extension: &str,
        segments: &[Segment],
    ) -> Result<Vec<PathBuf>>;

    /// Check if the cutting binary is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media tool instances
pub struct MediaToolFactory;

impl MediaToolFactory {
    /// Create the default prober implementation (ffprobe-based)
    pub fn create_prober(config: MediaConfig) -> Box<dyn MediaProber> {
        Box::new(processor::FfprobeProber::new(config))
    }

    /// Create the default cutting tool implementation (ffmpeg-based)
    pub fn create_cutter(config: MediaConfig) -> Box<dyn CuttingTool> {
        Box::new(processor::FfmpegCutter::new(config))
    }
}
