//! Machine-readable summary of a finished collage.

use serde::Serialize;
use std::path::PathBuf;

use crate::layout::{LayoutSpec, Placement};
use crate::persist::OutputFormat;

/// One source image and where it was pasted.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedImage {
    pub path: PathBuf,
    #[serde(flatten)]
    pub placement: Placement,
}

/// What was written, and how the images were arranged.
#[derive(Debug, Clone, Serialize)]
pub struct CollageReport {
    /// Output file
    pub output: PathBuf,
    pub format: OutputFormat,
    pub image_count: usize,
    pub layout: LayoutSpec,
    pub images: Vec<PlacedImage>,
    /// Wall-clock time from load to write
    pub elapsed_ms: u64,
}

impl CollageReport {
    pub fn new(
        output: PathBuf,
        format: OutputFormat,
        layout: LayoutSpec,
        paths: &[PathBuf],
        elapsed_ms: u64,
    ) -> Self {
        let images = paths
            .iter()
            .zip(layout.placements())
            .map(|(path, placement)| PlacedImage {
                path: path.clone(),
                placement,
            })
            .collect();
        Self {
            output,
            format,
            image_count: layout.image_count(),
            layout,
            images,
            elapsed_ms,
        }
    }

    /// Serialize the report to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CellSize, LayoutEngine};

    fn report() -> CollageReport {
        let layout = LayoutEngine::new(2, 10, 20)
            .unwrap()
            .compute(&[CellSize::new(100, 100); 3])
            .unwrap();
        let paths: Vec<PathBuf> = ["a.png", "b.png", "c.png"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        CollageReport::new(
            PathBuf::from("result.tif"),
            OutputFormat::Tiff,
            layout,
            &paths,
            12,
        )
    }

    #[test]
    fn test_report_pairs_paths_with_placements() {
        let report = report();
        assert_eq!(report.image_count, 3);
        assert_eq!(report.images.len(), 3);
        let third = &report.images[2];
        assert_eq!(third.path, PathBuf::from("c.png"));
        assert_eq!((third.placement.x, third.placement.y), (130, 20));
    }

    #[test]
    fn test_report_json() {
        let json = report().to_json(false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["format"], "tiff");
        assert_eq!(value["layout"]["canvas_width"], 250);
        assert_eq!(value["layout"]["columns"], 2);
        assert_eq!(value["layout"]["cell_sizing"], "uniform");
        assert_eq!(value["images"][1]["path"], "b.png");
        assert_eq!(value["images"][1]["row"], 1);
        assert!(value["layout"].get("column_offsets").is_none());
    }
}
