//! Sub-configuration structs with their defaults.

use crate::layout::CellSizing;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Grid layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of grid rows; columns are derived from the image count
    pub rows: u32,

    /// Gap between neighbouring cells in pixels
    pub spacing: u32,

    /// Border around the whole grid in pixels
    pub margin: u32,

    /// How cell sizes are chosen.
    /// `uniform` sizes every cell from the first image (overflowing images
    /// may overlap their neighbours); `per_track` sizes each column and row
    /// from the largest image in it.
    pub cell_sizing: CellSizing,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows: 2,
            spacing: 10,
            margin: 20,
            cell_sizing: CellSizing::Uniform,
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the collage is written
    pub path: PathBuf,

    /// Output format ("tiff", "png", "jpeg" or "bmp")
    pub format: String,

    /// JPEG quality (1-100), only used for JPEG output
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("result.tif"),
            format: "tiff".to_string(),
            jpeg_quality: 90,
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of images decoded concurrently
    pub parallel_workers: usize,

    /// File extensions picked up when a directory is given as input
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
                "bmp".to_string(),
                "gif".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
        }
    }
}

/// Public-folder download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Public resources endpoint of the file-hosting API
    pub api_base: String,

    /// Share key (or public URL) of the shared folder tree
    pub public_key: String,

    /// Local directory that downloaded folders are written into
    pub download_dir: PathBuf,

    /// Maximum number of entries requested per folder listing
    pub page_limit: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://cloud-api.yandex.net/v1/disk/public/resources".to_string(),
            public_key: String::new(),
            download_dir: PathBuf::from("images"),
            page_limit: 1000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
