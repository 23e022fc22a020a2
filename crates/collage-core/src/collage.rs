//! End-to-end collage creation: load → layout → render → persist.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::error::{LayoutError, Result};
use crate::layout::{LayoutEngine, LayoutSpec};
use crate::persist::{CollagePersister, OutputFormat};
use crate::render::{Canvas, CollageRenderer};
use crate::report::CollageReport;
use crate::source::{FileDiscovery, FileImageSource, ImageSource};

/// Builds and saves collages with one fixed configuration.
///
/// Holds no per-collage state, so a single creator can build any number of
/// collages, to different output paths.
pub struct CollageCreator {
    source: FileImageSource,
    discovery: FileDiscovery,
    engine: LayoutEngine,
    renderer: CollageRenderer,
    persister: CollagePersister,
    workers: usize,
}

impl CollageCreator {
    /// Create a collage creator. Fails if the configured row count is zero.
    pub fn new(config: &Config) -> Result<Self> {
        let engine = LayoutEngine::from_config(&config.layout)?;
        tracing::debug!(
            "CollageCreator: rows={} spacing={} margin={} cell_sizing={:?}",
            config.layout.rows,
            config.layout.spacing,
            config.layout.margin,
            config.layout.cell_sizing
        );
        Ok(Self {
            source: FileImageSource::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
            engine,
            renderer: CollageRenderer::new(),
            persister: CollagePersister::from_config(&config.output),
            workers: config.processing.parallel_workers.max(1),
        })
    }

    /// Expand files and folders into the ordered list of images to use.
    pub fn discover(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        self.discovery.discover_all(inputs)
    }

    /// Lay out and render already decoded images.
    pub fn compose_images(
        &self,
        images: &[DynamicImage],
    ) -> std::result::Result<(Canvas, LayoutSpec), LayoutError> {
        let layout = self.engine.compute_for_images(images)?;
        let canvas = self.renderer.render(images, &layout)?;
        Ok((canvas, layout))
    }

    /// Load, lay out and render the images at `paths` without saving.
    pub fn compose(&self, paths: &[PathBuf]) -> Result<(Canvas, LayoutSpec)> {
        ensure_not_empty(paths)?;
        let images = self.source.load(paths)?;
        Ok(self.compose_images(&images)?)
    }

    /// Build a collage from `paths` and write it to `output`.
    pub fn create_and_save(
        &self,
        paths: &[PathBuf],
        output: &Path,
        format: OutputFormat,
    ) -> Result<CollageReport> {
        self.create_and_save_from(&self.source, paths, output, format)
    }

    /// Like [`create_and_save`](Self::create_and_save), loading images
    /// through `source`.
    pub fn create_and_save_from<S: ImageSource + ?Sized>(
        &self,
        source: &S,
        paths: &[PathBuf],
        output: &Path,
        format: OutputFormat,
    ) -> Result<CollageReport> {
        ensure_not_empty(paths)?;
        let start = Instant::now();
        tracing::debug!("Loading {} image(s)", paths.len());
        let images = source.load(paths)?;
        self.finish(paths, &images, output, format, start)
    }

    /// Like [`create_and_save`](Self::create_and_save), decoding images
    /// concurrently with the configured number of workers.
    pub async fn create_and_save_concurrent(
        &self,
        paths: &[PathBuf],
        output: &Path,
        format: OutputFormat,
    ) -> Result<CollageReport> {
        ensure_not_empty(paths)?;
        let start = Instant::now();
        tracing::debug!(
            "Loading {} image(s) with {} worker(s)",
            paths.len(),
            self.workers
        );
        let images = self.source.load_concurrent(paths, self.workers).await?;
        self.finish(paths, &images, output, format, start)
    }

    fn finish(
        &self,
        paths: &[PathBuf],
        images: &[DynamicImage],
        output: &Path,
        format: OutputFormat,
        start: Instant,
    ) -> Result<CollageReport> {
        let (canvas, layout) = self.compose_images(images)?;
        self.persister.save(canvas, output, format)?;

        let elapsed = start.elapsed();
        tracing::info!(
            "Collage of {} image(s) ({}x{} grid) saved to {:?} in {:?}",
            images.len(),
            layout.columns(),
            layout.rows(),
            output,
            elapsed
        );
        Ok(CollageReport::new(
            output.to_path_buf(),
            format,
            layout,
            paths,
            elapsed.as_millis() as u64,
        ))
    }
}

fn ensure_not_empty(paths: &[PathBuf]) -> std::result::Result<(), LayoutError> {
    if paths.is_empty() {
        return Err(LayoutError::invalid("a collage needs at least one image"));
    }
    Ok(())
}
