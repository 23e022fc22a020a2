//! Encoding and writing the finished collage.
//!
//! Writes are atomic: the canvas is encoded into a temporary file next to the
//! target and renamed over it, so a failed encode never leaves a truncated
//! file at the output path.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageResult};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::config::OutputConfig;
use crate::error::PersistError;
use crate::render::Canvas;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless tagged image file (default)
    #[default]
    Tiff,
    Png,
    Jpeg,
    Bmp,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tif" | "tiff" => Some(Self::Tiff),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tiff => "tif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Tiff => ImageFormat::Tiff,
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Tiff => write!(f, "tiff"),
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Bmp => write!(f, "bmp"),
        }
    }
}

/// Encodes a [`Canvas`] and writes it to disk.
#[derive(Debug, Clone)]
pub struct CollagePersister {
    jpeg_quality: u8,
}

impl Default for CollagePersister {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl CollagePersister {
    /// Create a persister with the given JPEG quality (1-100).
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.jpeg_quality)
    }

    /// Encode `canvas` as `format` and atomically replace `path` with it.
    ///
    /// Takes the canvas by value; it is dropped once written. An existing
    /// file at `path` is overwritten. The parent directory must exist.
    pub fn save(
        &self,
        canvas: Canvas,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), PersistError> {
        let io_error = |source: std::io::Error| PersistError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = temp_file_in(dir).map_err(io_error)?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            self.encode(&canvas, &mut writer, format)
                .map_err(|e| PersistError::Encode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            writer.flush().map_err(io_error)?;
        }
        keep_existing_permissions(&tmp, path).map_err(io_error)?;

        tmp.persist(path).map_err(|e| io_error(e.error))?;

        tracing::info!(
            "Saved {}x{} collage as {} to {:?}",
            canvas.width(),
            canvas.height(),
            format,
            path
        );
        Ok(())
    }

    /// Like [`save`](Self::save), with the format given by name.
    pub fn save_as(&self, canvas: Canvas, path: &Path, format: &str) -> Result<(), PersistError> {
        let format = OutputFormat::parse(format).ok_or_else(|| PersistError::UnsupportedFormat {
            format: format.to_string(),
        })?;
        self.save(canvas, path, format)
    }

    fn encode<W: Write + Seek>(
        &self,
        canvas: &Canvas,
        writer: &mut W,
        format: OutputFormat,
    ) -> ImageResult<()> {
        match format {
            OutputFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(writer, self.jpeg_quality);
                encoder.encode_image(canvas.as_image())
            }
            other => canvas.as_image().write_to(writer, other.image_format()),
        }
    }
}

/// Create the temporary output file in `dir`.
///
/// On Unix the file is opened with mode `0o666`, so the process umask
/// applies exactly as for a plain `File::create`.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tempfile::Builder::new()
            .permissions(std::fs::Permissions::from_mode(0o666))
            .tempfile_in(dir)
    }
    #[cfg(not(unix))]
    {
        NamedTempFile::new_in(dir)
    }
}

/// Give `tmp` the permissions of the file it is about to replace, if any.
fn keep_existing_permissions(tmp: &NamedTempFile, target: &Path) -> std::io::Result<()> {
    match std::fs::metadata(target) {
        Ok(existing) => tmp.as_file().set_permissions(existing.permissions()),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb};

    fn sample_canvas() -> Canvas {
        let mut canvas = Canvas::blank(37, 23);
        let block = image::RgbImage::from_pixel(5, 5, Rgb([200, 10, 10]));
        let block = image::DynamicImage::ImageRgb8(block);
        canvas.paste(&block, 3, 4);
        canvas
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("TIFF"), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::parse("tif"), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::parse("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::parse("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::parse("psd"), None);
        assert_eq!(OutputFormat::default(), OutputFormat::Tiff);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/result.TIF")),
            Some(OutputFormat::Tiff)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("collage.jpeg")),
            Some(OutputFormat::Jpeg)
        );
        assert_eq!(OutputFormat::from_path(Path::new("collage")), None);
    }

    #[test]
    fn test_tiff_round_trip_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.tif");

        CollagePersister::default()
            .save(sample_canvas(), &path, OutputFormat::Tiff)
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*"));
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (37, 23));
        assert_eq!(decoded.to_rgb8().as_raw(), sample_canvas().as_raw());
    }

    #[test]
    fn test_png_and_bmp_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        for format in [OutputFormat::Png, OutputFormat::Bmp] {
            let path = dir.path().join(format!("result.{}", format.extension()));
            CollagePersister::default()
                .save(sample_canvas(), &path, format)
                .unwrap();
            let decoded = image::open(&path).unwrap();
            assert_eq!(decoded.to_rgb8().as_raw(), sample_canvas().as_raw());
        }
    }

    #[test]
    fn test_jpeg_round_trip_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.jpg");
        CollagePersister::new(80)
            .save(sample_canvas(), &path, OutputFormat::Jpeg)
            .unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (37, 23));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.tif");
        std::fs::write(&path, b"stale contents").unwrap();

        CollagePersister::default()
            .save(sample_canvas(), &path, OutputFormat::Tiff)
            .unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (37, 23));
        // Only the output remains; the temporary file was renamed away.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_into_missing_directory_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("result.tif");

        let err = CollagePersister::default()
            .save(sample_canvas(), &path, OutputFormat::Tiff)
            .unwrap_err();

        assert!(matches!(err, PersistError::Io { .. }));
        assert!(err.to_string().contains("result.tif"));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_as_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.psd");

        let err = CollagePersister::default()
            .save_as(sample_canvas(), &path, "psd")
            .unwrap_err();

        assert!(matches!(err, PersistError::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_gets_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        std::fs::write(&plain, b"x").unwrap();
        let path = dir.path().join("result.tif");

        CollagePersister::default()
            .save(sample_canvas(), &path, OutputFormat::Tiff)
            .unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.png");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        CollagePersister::default()
            .save(sample_canvas(), &path, OutputFormat::Png)
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
