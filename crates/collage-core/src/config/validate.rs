//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.rows == 0 {
            return Err(ConfigError::ValidationError(
                "layout.rows must be > 0".into(),
            ));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.path must not be empty".into(),
            ));
        }
        self.output_format()?;
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.remote.page_limit == 0 {
            return Err(ConfigError::ValidationError(
                "remote.page_limit must be > 0".into(),
            ));
        }
        Ok(())
    }
}
