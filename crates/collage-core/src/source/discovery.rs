//! Expands input paths (files and folders) into an ordered list of image files.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files in directories.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover the image files behind a single input.
    ///
    /// A file is returned as-is, whatever its extension: it was named
    /// explicitly and the loader reports it if it cannot be decoded.
    /// A directory is walked recursively for files with a supported
    /// extension, sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if !path.is_dir() {
            return vec![path.to_path_buf()];
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        tracing::debug!("Found {} image(s) in {:?}", files.len(), path);
        files
    }

    /// Discover every input in order, concatenating the results.
    ///
    /// Input order is preserved; files inside one directory are sorted.
    pub fn discover_all(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        inputs.iter().flat_map(|input| self.discover(input)).collect()
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
