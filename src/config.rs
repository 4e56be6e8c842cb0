use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{KiremeError, Result};

fn default_extension() -> String {
    ".mp4".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["auto".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub media: MediaConfig,
    pub defaults: ChannelDefaults,
    /// Per-channel overrides keyed by base name. Resolved against the
    /// defaults once per operation; never mutated in place.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to the cutting tool binary (ffmpeg)
    pub binary_path: String,
    /// Path to the prober binary (ffprobe)
    pub prober_path: String,
    /// Additional options passed to every segment cut
    /// Common options: ["-avoid_negative_ts", "make_zero"]
    pub cut_options: Vec<String>,
}

/// Global defaults for output handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDefaults {
    /// Output container extension, leading dot included
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Subtitle languages offered for merging
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Language code used when duplicating a successful `auto` merge
    #[serde(default)]
    pub auto_save_language: Option<String>,
}

/// Per-channel override record. Every field is optional; unset fields fall
/// back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelOptions {
    pub extension: Option<String>,
    pub languages: Option<Vec<String>>,
    pub auto_save_language: Option<String>,
}

/// Options actually used by one cut or merge invocation. Immutable once
/// resolved; replaces the original design's live-mutated shared dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub extension: String,
    pub languages: Vec<String>,
    pub auto_save_language: Option<String>,
}

impl ResolvedOptions {
    /// Pure merge of defaults and an optional per-channel override.
    /// Invalid values become configuration errors, not dialog text.
    pub fn resolve(defaults: &ChannelDefaults, overrides: Option<&ChannelOptions>) -> Result<Self> {
        let extension = overrides
            .and_then(|o| o.extension.clone())
            .unwrap_or_else(|| defaults.extension.clone());
        let languages = overrides
            .and_then(|o| o.languages.clone())
            .unwrap_or_else(|| defaults.languages.clone());
        let auto_save_language = overrides
            .and_then(|o| o.auto_save_language.clone())
            .or_else(|| defaults.auto_save_language.clone());

        validate_extension(&extension)?;
        for language in &languages {
            validate_language(language)?;
        }
        if let Some(language) = &auto_save_language {
            validate_language(language)?;
        }

        Ok(Self {
            extension,
            languages,
            auto_save_language,
        })
    }
}

fn validate_extension(extension: &str) -> Result<()> {
    if extension.len() < 2 || !extension.starts_with('.') || extension[1..].contains('.') {
        return Err(KiremeError::Config(format!(
            "Invalid output extension '{}': expected a single-dot extension like '.mp4'",
            extension
        )));
    }
    Ok(())
}

fn validate_language(language: &str) -> Result<()> {
    let valid = !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(KiremeError::Config(format!(
            "Invalid language code '{}'",
            language
        )));
    }
    Ok(())
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            prober_path: "ffprobe".to_string(),
            cut_options: vec![
                // Example options users can customize:
                // "-avoid_negative_ts".to_string(), "make_zero".to_string(),
            ],
        }
    }
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            languages: default_languages(),
            auto_save_language: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KiremeError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| KiremeError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KiremeError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| KiremeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Resolve the effective options for one base name.
    pub fn options_for(&self, base_name: &str) -> Result<ResolvedOptions> {
        ResolvedOptions::resolve(&self.defaults, self.channels.get(base_name))
    }
}
