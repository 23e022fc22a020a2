//! Error types for the collage pipeline.
//!
//! Errors are organized by stage (source, layout, persist, remote) so that a
//! failure always names the file, format or URL involved.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for collage operations.
#[derive(Error, Debug)]
pub enum CollageError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image loading errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Invalid layout input
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Encoding or writing the collage failed
    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),

    /// Remote folder download errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Image loading errors. Every variant names the offending path.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Layout and render input errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The inputs cannot form a collage
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LayoutError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Errors raised while encoding and writing the collage.
#[derive(Error, Debug)]
pub enum PersistError {
    /// The target path could not be written
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder rejected the canvas
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The requested output format is not supported
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },
}

/// Errors from the remote public-folder client.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// HTTP request failed or returned an error status
    #[error("Request to {url} failed: {message}")]
    Http {
        url: String,
        message: String,
        /// HTTP status code, when a response was received
        status_code: Option<u16>,
    },

    /// The API response did not contain a download link
    #[error("No download link for {path}")]
    MissingLink { path: String },

    /// Writing a downloaded file failed
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for collage results.
pub type Result<T> = std::result::Result<T, CollageError>;

/// Convenience type alias for source-specific results.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
