use thiserror::Error;

#[derive(Error, Debug)]
pub enum KiremeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Segment validation error: {0}")]
    Validation(String),

    #[error("Timecode format error: {0}")]
    Timecode(String),

    #[error("Media probe error: {0}")]
    Probe(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Operation already in flight for '{0}'")]
    Busy(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, KiremeError>;
