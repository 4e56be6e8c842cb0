use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{KiremeError, Result};

/// Abstract external-tool command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media tool command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.arg("-c:v").arg("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.arg("-c:a").arg("copy")
    }

    /// Seek to a start position (seconds)
    pub fn seek_start(self, seconds: f64) -> Self {
        self.arg("-ss").arg(seconds.to_string())
    }

    /// Stop at an absolute end position (seconds)
    pub fn stop_at(self, seconds: f64) -> Self {
        self.arg("-to").arg(seconds.to_string())
    }

    /// Execute the command, failing on a non-zero exit status.
    pub async fn execute(&self) -> Result<()> {
        self.execute_for_stdout().await.map(|_| ())
    }

    /// Execute the command and capture stdout.
    pub async fn execute_for_stdout(&self) -> Result<String> {
        debug!("Executing media tool command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);

        let output = cmd
            .output()
            .map_err(|e| KiremeError::Media(format!("Failed to execute media tool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KiremeError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the cutting and probing operations this engine needs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build a lossless stream-copy command for one segment
    pub fn cut_segment<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        output: Q,
        start: f64,
        end: f64,
        extra_options: &[String],
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, format!("Segment cut ({}s - {}s)", start, end))
            .overwrite()
            .input(&source)
            .seek_start(start)
            .stop_at(end)
            .copy_video()
            .copy_audio();

        for option in extra_options {
            cmd = cmd.arg(option);
        }

        cmd.output(output)
    }

    /// Build a JSON probe command (format + streams)
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Media probe")
            .arg("-v")
            .arg("error")
            .arg("-show_format")
            .arg("-show_streams")
            .arg("-of")
            .arg("json")
            .input(path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}
