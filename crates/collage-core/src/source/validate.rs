//! Cheap checks run before a file is handed to the decoder.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::SourceError;

/// Number of leading bytes inspected for a format signature.
const HEADER_LEN: usize = 12;

/// Validates files before decoding.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that `path` exists, is within the size limit and starts with a
    /// known image signature.
    ///
    /// Returns the name of the detected container format.
    pub fn validate(&self, path: &Path) -> Result<&'static str, SourceError> {
        if !path.exists() {
            return Err(SourceError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| SourceError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(SourceError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let header = Self::read_header(path)?;
        detect_signature(&header).ok_or_else(|| SourceError::Decode {
            path: path.to_path_buf(),
            message: "Unrecognized image format (invalid magic bytes)".to_string(),
        })
    }

    fn read_header(path: &Path) -> Result<Vec<u8>, SourceError> {
        let file = std::fs::File::open(path).map_err(|e| SourceError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = Vec::with_capacity(HEADER_LEN);
        file.take(HEADER_LEN as u64)
            .read_to_end(&mut header)
            .map_err(|e| SourceError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })?;

        if header.len() < 4 {
            return Err(SourceError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }
        Ok(header)
    }
}

/// Identify an image container from its leading bytes.
pub fn detect_signature(header: &[u8]) -> Option<&'static str> {
    match header {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        // Truncated RIFF header: let the decoder decide.
        [b'R', b'I', b'F', b'F', rest @ ..] if rest.len() < 8 => Some("webp"),
        [b'B', b'M', ..] => Some("bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("tiff"),
        _ => None,
    }
}
