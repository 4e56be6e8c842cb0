use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use super::{CuttingTool, MediaCommandBuilder, MediaInfo, MediaProber};
use crate::config::MediaConfig;
use crate::error::{KiremeError, Result};
use crate::naming::media_part_name;
use crate::segment::Segment;

// Structs for parsing ffprobe JSON output
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    r_frame_rate: Option<String>,
}

/// Concrete prober implementation (ffprobe-based)
pub struct FfprobeProber {
    command_builder: MediaCommandBuilder,
    binary_path: String,
}

impl FfprobeProber {
    /// Create a new prober implementation
    pub fn new(config: MediaConfig) -> Self {
        Self {
            command_builder: MediaCommandBuilder::new(&config.prober_path),
            binary_path: config.prober_path,
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        debug!("Probing media file: {}", path.display());

        let stdout = self
            .command_builder
            .probe(path)
            .execute_for_stdout()
            .await
            .map_err(|e| KiremeError::Probe(e.to_string()))?;

        let parsed: ProbeOutput = serde_json::from_str(&stdout)
            .map_err(|e| KiremeError::Probe(format!("Unreadable probe output: {}", e)))?;

        let duration_seconds = parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| {
                KiremeError::Probe(format!("No duration reported for {}", path.display()))
            })?;

        let video_stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"));
        let frame_rate = video_stream
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate);

        Ok(MediaInfo {
            duration_seconds,
            is_video: video_stream.is_some(),
            frame_rate,
        })
    }

    fn check_availability(&self) -> Result<()> {
        check_binary(&self.binary_path, "Media prober")
    }
}

/// Concrete cutting tool implementation (ffmpeg-based)
pub struct FfmpegCutter {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegCutter {
    /// Create a new cutting tool implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl CuttingTool for FfmpegCutter {
    async fn cut(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
        extension: &str,
        segments: &[Segment],
    ) -> Result<Vec<PathBuf>> {
        info!(
            "Cutting {} into {} segments",
            source.display(),
            segments.len()
        );

        let mut outputs = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let output = output_dir.join(media_part_name(base_name, i + 1, extension));
            let command = self.command_builder.cut_segment(
                source,
                &output,
                segment.start,
                segment.end,
                &self.config.cut_options,
            );

            // A failure partway aborts creation of the remaining segments.
            command.execute().await?;
            outputs.push(output);
        }

        info!("Segment cutting completed: {} files", outputs.len());
        Ok(outputs)
    }

    fn check_availability(&self) -> Result<()> {
        check_binary(&self.config.binary_path, "Cutting tool")
    }
}

fn check_binary(binary_path: &str, label: &str) -> Result<()> {
    let output = Command::new(binary_path)
        .arg("-version")
        .output()
        .map_err(|e| KiremeError::Media(format!("{} not found: {}", label, e)))?;

    if output.status.success() {
        info!("{} is available", label);
        Ok(())
    } else {
        Err(KiremeError::Media(format!("{} version check failed", label)))
    }
}

/// ffprobe reports frame rate as a fraction like `30000/1001`.
fn parse_frame_rate(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            if den == 0.0 { None } else { Some(num / den) }
        }
        None => text.parse::<f64>().ok(),
    }
}
