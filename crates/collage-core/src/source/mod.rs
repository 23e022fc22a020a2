//! Loading images from disk.
//!
//! - **discovery**: expand files and folders into an ordered file list
//! - **validate**: existence, size limit and magic-byte checks
//! - **decode**: decode with content-based format detection
//!
//! Loading is all-or-nothing: the first file that fails aborts the whole
//! load with an error naming that file, so no collage is ever built from a
//! partial set.

pub mod decode;
pub mod discovery;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use validate::Validator;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use image::DynamicImage;
use std::path::{Path, PathBuf};

use crate::config::LimitsConfig;
use crate::error::{SourceError, SourceResult};

/// Produces decoded images from file paths, one per path, in order.
pub trait ImageSource {
    fn load(&self, paths: &[PathBuf]) -> SourceResult<Vec<DynamicImage>>;
}

/// [`ImageSource`] reading from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    validator: Validator,
    decoder: ImageDecoder,
}

impl FileImageSource {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            decoder: ImageDecoder::new(limits),
        }
    }

    /// Validate and decode a single file.
    pub fn load_one(&self, path: &Path) -> SourceResult<DynamicImage> {
        let signature = self.validator.validate(path)?;
        tracing::trace!("Validated {:?} ({})", path, signature);
        Ok(self.decoder.decode(path)?.image)
    }

    /// Decode up to `workers` files at a time on the blocking thread pool.
    ///
    /// Output order matches `paths` regardless of completion order.
    pub async fn load_concurrent(
        &self,
        paths: &[PathBuf],
        workers: usize,
    ) -> SourceResult<Vec<DynamicImage>> {
        let images: Vec<DynamicImage> = stream::iter(paths.iter().cloned())
            .map(|path| {
                let source = self.clone();
                async move {
                    let task_path = path.clone();
                    tokio::task::spawn_blocking(move || source.load_one(&task_path))
                        .await
                        .map_err(|e| SourceError::Decode {
                            path,
                            message: format!("Task join error: {}", e),
                        })?
                }
            })
            .buffered(workers.max(1))
            .try_collect()
            .await?;

        tracing::debug!("Loaded {} image(s) with {} worker(s)", images.len(), workers);
        Ok(images)
    }
}

impl ImageSource for FileImageSource {
    fn load(&self, paths: &[PathBuf]) -> SourceResult<Vec<DynamicImage>> {
        let images = paths
            .iter()
            .map(|path| self.load_one(path))
            .collect::<SourceResult<Vec<_>>>()?;
        tracing::debug!("Loaded {} image(s)", images.len());
        Ok(images)
    }
}
