use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for crack analysis
#[derive(Error, Debug)]
pub enum CrackError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

impl CrackError {
    /// Shorthand for building an `InvalidInput` error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CrackError::InvalidInput(msg.into())
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, CrackError>;
