//! Grid geometry for the collage: canvas size and per-image placement.
//!
//! Images fill the grid column-major: every row of column 0 is filled before
//! column 1 starts, so image `i` sits at `column = i / rows`,
//! `row = i % rows`. The mapping lives in [`grid_position`] and is the only
//! place it is computed; the renderer reads placements from the
//! [`LayoutSpec`] rather than re-deriving them.
//!
//! # Cell sizing
//!
//! With [`CellSizing::Uniform`] (the default) every cell takes the size of the
//! **first** image. Other images are not inspected, so a larger image
//! overflows its cell and may be partly covered by the next paste. Inputs are
//! expected to share a size in this mode.
//!
//! [`CellSizing::PerTrack`] sizes each column by its widest image and each
//! row by its tallest image, which guarantees no overlap for mixed sizes.
//! For equally sized images both modes give identical layouts.
//!
//! This module is pure geometry: no pixels are touched.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::LayoutError;

/// How grid cells are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSizing {
    /// Every cell uses the first image's size
    #[default]
    Uniform,
    /// Each column/row uses the largest image it contains
    PerTrack,
}

impl CellSizing {
    /// Parse from string (case-insensitive, `-` and `_` interchangeable).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "uniform" => Some(Self::Uniform),
            "per_track" | "pertrack" => Some(Self::PerTrack),
            _ => None,
        }
    }
}

/// Width and height of a cell or image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of a decoded image.
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

/// Grid coordinates of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridPosition {
    pub column: u32,
    pub row: u32,
}

/// Column-major grid position of image `index` in a grid with `rows` rows.
///
/// `rows` must be non-zero.
pub fn grid_position(index: usize, rows: u32) -> GridPosition {
    let rows = rows as usize;
    GridPosition {
        column: (index / rows) as u32,
        row: (index % rows) as u32,
    }
}

/// Where a single image is pasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Position of the image in the input sequence
    pub index: usize,
    pub column: u32,
    pub row: u32,
    /// Top-left corner on the canvas
    pub x: u32,
    pub y: u32,
    /// Size of the cell the image is placed in
    pub cell_width: u32,
    pub cell_height: u32,
}

/// Computed grid shape, canvas size and track offsets.
///
/// Immutable once computed; shared by reference between layout consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutSpec {
    rows: u32,
    columns: u32,
    spacing: u32,
    margin: u32,
    canvas_width: u32,
    canvas_height: u32,
    /// Reference cell, taken from the first image
    cell: CellSize,
    cell_sizing: CellSizing,
    image_count: usize,
    column_widths: Vec<u32>,
    row_heights: Vec<u32>,
    #[serde(skip)]
    column_offsets: Vec<u32>,
    #[serde(skip)]
    row_offsets: Vec<u32>,
}

impl LayoutSpec {
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    /// Canvas size as `(width, height)`.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    /// The reference cell size (first image's dimensions).
    pub fn cell(&self) -> CellSize {
        self.cell
    }

    pub fn cell_sizing(&self) -> CellSizing {
        self.cell_sizing
    }

    /// Number of images the layout was computed for.
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Number of cells in the grid (`rows × columns`).
    pub fn capacity(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    pub fn column_widths(&self) -> &[u32] {
        &self.column_widths
    }

    pub fn row_heights(&self) -> &[u32] {
        &self.row_heights
    }

    /// Placement of image `index`, or `None` if it lies outside the grid.
    pub fn placement(&self, index: usize) -> Option<Placement> {
        if index >= self.capacity() {
            return None;
        }
        let pos = grid_position(index, self.rows);
        let (column, row) = (pos.column as usize, pos.row as usize);
        Some(Placement {
            index,
            column: pos.column,
            row: pos.row,
            x: self.column_offsets[column],
            y: self.row_offsets[row],
            cell_width: self.column_widths[column],
            cell_height: self.row_heights[row],
        })
    }

    /// Placements for every image the layout was computed for, in input order.
    pub fn placements(&self) -> Vec<Placement> {
        (0..self.image_count)
            .filter_map(|index| self.placement(index))
            .collect()
    }
}

/// Computes [`LayoutSpec`]s for a fixed row count, spacing and margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEngine {
    rows: u32,
    spacing: u32,
    margin: u32,
    sizing: CellSizing,
}

impl LayoutEngine {
    /// Create an engine in uniform cell mode. Fails if `rows` is zero.
    pub fn new(rows: u32, spacing: u32, margin: u32) -> Result<Self, LayoutError> {
        if rows == 0 {
            return Err(LayoutError::invalid("row count must be at least 1"));
        }
        Ok(Self {
            rows,
            spacing,
            margin,
            sizing: CellSizing::Uniform,
        })
    }

    /// Create an engine from layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Result<Self, LayoutError> {
        let engine = Self::new(config.rows, config.spacing, config.margin)?;
        Ok(engine.with_cell_sizing(config.cell_sizing))
    }

    /// Switch the cell sizing mode.
    pub fn with_cell_sizing(mut self, sizing: CellSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Compute the layout for decoded images.
    pub fn compute_for_images(&self, images: &[DynamicImage]) -> Result<LayoutSpec, LayoutError> {
        let sizes: Vec<CellSize> = images.iter().map(CellSize::of).collect();
        self.compute(&sizes)
    }

    /// Compute the layout for images of the given sizes, in input order.
    pub fn compute(&self, sizes: &[CellSize]) -> Result<LayoutSpec, LayoutError> {
        let Some(&cell) = sizes.first() else {
            return Err(LayoutError::invalid("a collage needs at least one image"));
        };

        let count = sizes.len();
        let rows = self.rows as usize;
        let columns = count.div_ceil(rows);
        let column_count = u32::try_from(columns).map_err(|_| {
            LayoutError::invalid(format!("{count} images need more than {} columns", u32::MAX))
        })?;

        // Rows past the image count hold nothing and take the reference height.
        let filled_rows = count.min(rows);
        let (column_widths, mut row_heights) = match self.sizing {
            CellSizing::Uniform => (vec![cell.width; columns], vec![cell.height; filled_rows]),
            CellSizing::PerTrack => self.track_extents(sizes, columns, filled_rows),
        };
        let empty_rows = self.rows - filled_rows as u32;
        self.check_height(&row_heights, empty_rows, cell.height)?;
        row_heights.resize(rows, cell.height);

        let (column_offsets, canvas_width) =
            track_offsets(&column_widths, self.spacing, self.margin, "width")?;
        let (row_offsets, canvas_height) =
            track_offsets(&row_heights, self.spacing, self.margin, "height")?;

        tracing::debug!(
            "Layout: {} image(s) in {}x{} grid (cols x rows), cell {}x{}, canvas {}x{}",
            count,
            column_count,
            self.rows,
            cell.width,
            cell.height,
            canvas_width,
            canvas_height
        );

        Ok(LayoutSpec {
            rows: self.rows,
            columns: column_count,
            spacing: self.spacing,
            margin: self.margin,
            canvas_width,
            canvas_height,
            cell,
            cell_sizing: self.sizing,
            image_count: count,
            column_widths,
            row_heights,
            column_offsets,
            row_offsets,
        })
    }

    /// Largest width per column and largest height per filled row.
    ///
    /// Every column and every one of the first `filled_rows` rows holds at
    /// least one image.
    fn track_extents(
        &self,
        sizes: &[CellSize],
        columns: usize,
        filled_rows: usize,
    ) -> (Vec<u32>, Vec<u32>) {
        let mut widths = vec![0u32; columns];
        let mut heights = vec![0u32; filled_rows];

        for (index, size) in sizes.iter().enumerate() {
            let pos = grid_position(index, self.rows);
            let width = &mut widths[pos.column as usize];
            *width = (*width).max(size.width);
            let height = &mut heights[pos.row as usize];
            *height = (*height).max(size.height);
        }
        (widths, heights)
    }

    /// Reject a canvas taller than `u32::MAX` before any per-row storage
    /// proportional to the row count is allocated.
    fn check_height(
        &self,
        filled: &[u32],
        empty_rows: u32,
        empty_height: u32,
    ) -> Result<(), LayoutError> {
        let tracks: u64 = filled.iter().map(|&h| u64::from(h)).sum::<u64>()
            + u64::from(empty_rows) * u64::from(empty_height);
        let gaps = u64::from(self.rows - 1) * u64::from(self.spacing);
        let total = tracks + gaps + 2 * u64::from(self.margin);
        if total > u64::from(u32::MAX) {
            return Err(LayoutError::invalid(format!(
                "canvas height exceeds {} pixels",
                u32::MAX
            )));
        }
        Ok(())
    }
}

/// Compute the layout for `images` in uniform cell mode.
///
/// Fails if `images` is empty or `rows` is zero.
pub fn compute_layout(
    images: &[DynamicImage],
    rows: u32,
    spacing: u32,
    margin: u32,
) -> Result<LayoutSpec, LayoutError> {
    LayoutEngine::new(rows, spacing, margin)?.compute_for_images(images)
}

/// Start offset of every track plus the total canvas extent along one axis:
/// `margin + Σ lengths + (n − 1)·spacing + margin`.
fn track_offsets(
    lengths: &[u32],
    spacing: u32,
    margin: u32,
    axis: &str,
) -> Result<(Vec<u32>, u32), LayoutError> {
    let to_u32 = |value: u64| {
        u32::try_from(value).map_err(|_| {
            LayoutError::invalid(format!("canvas {axis} exceeds {} pixels", u32::MAX))
        })
    };

    let mut offsets = Vec::with_capacity(lengths.len());
    let mut cursor = u64::from(margin);
    for (i, &length) in lengths.iter().enumerate() {
        if i > 0 {
            cursor += u64::from(spacing);
        }
        offsets.push(to_u32(cursor)?);
        cursor += u64::from(length);
    }
    let total = to_u32(cursor + u64::from(margin))?;
    Ok((offsets, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(count: usize, width: u32, height: u32) -> Vec<CellSize> {
        vec![CellSize::new(width, height); count]
    }

    fn overlaps(a: &Placement, b: &Placement) -> bool {
        a.x < b.x + b.cell_width
            && b.x < a.x + a.cell_width
            && a.y < b.y + b.cell_height
            && b.y < a.y + a.cell_height
    }

    #[test]
    fn test_four_square_images_two_rows() {
        let engine = LayoutEngine::new(2, 10, 20).unwrap();
        let layout = engine.compute(&uniform(4, 100, 100)).unwrap();

        assert_eq!(layout.columns(), 2);
        assert_eq!(layout.rows(), 2);
        assert_eq!(layout.canvas_size(), (250, 250));

        let third = layout.placement(2).unwrap();
        assert_eq!((third.column, third.row), (1, 0));
        assert_eq!((third.x, third.y), (130, 20));
    }

    #[test]
    fn test_single_image_single_row() {
        let engine = LayoutEngine::new(1, 10, 20).unwrap();
        let layout = engine.compute(&uniform(1, 64, 48)).unwrap();

        assert_eq!(layout.columns(), 1);
        assert_eq!(layout.canvas_size(), (64 + 40, 48 + 40));
        let only = layout.placement(0).unwrap();
        assert_eq!((only.x, only.y), (20, 20));
    }

    #[test]
    fn test_columns_round_up_and_canvas_closed_form() {
        for (count, rows) in [(1usize, 2u32), (3, 2), (5, 2), (7, 3), (9, 3), (10, 4)] {
            let (w, h, spacing, margin) = (30u32, 20u32, 7u32, 5u32);
            let layout = LayoutEngine::new(rows, spacing, margin)
                .unwrap()
                .compute(&uniform(count, w, h))
                .unwrap();

            let columns = count.div_ceil(rows as usize) as u32;
            assert_eq!(layout.columns(), columns, "count={count} rows={rows}");
            assert_eq!(
                layout.canvas_width(),
                columns * w + (columns - 1) * spacing + 2 * margin
            );
            assert_eq!(
                layout.canvas_height(),
                rows * h + (rows - 1) * spacing + 2 * margin
            );
            assert!(layout.capacity() >= count);
        }
    }

    #[test]
    fn test_fewer_images_than_rows_keeps_row_count() {
        let layout = LayoutEngine::new(2, 10, 20)
            .unwrap()
            .compute(&uniform(1, 100, 100))
            .unwrap();
        assert_eq!(layout.rows(), 2);
        assert_eq!(layout.columns(), 1);
        assert_eq!(layout.canvas_size(), (140, 250));
    }

    #[test]
    fn test_column_major_fill_order() {
        let layout = LayoutEngine::new(3, 0, 0)
            .unwrap()
            .compute(&uniform(7, 10, 10))
            .unwrap();
        let positions: Vec<(u32, u32)> = layout
            .placements()
            .iter()
            .map(|p| (p.column, p.row))
            .collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
    }

    #[test]
    fn test_placements_are_injective_and_within_canvas() {
        let layout = LayoutEngine::new(3, 4, 6)
            .unwrap()
            .compute(&uniform(11, 17, 9))
            .unwrap();
        let placements = layout.placements();
        assert_eq!(placements.len(), 11);

        for (i, a) in placements.iter().enumerate() {
            assert!(a.x + a.cell_width <= layout.canvas_width());
            assert!(a.y + a.cell_height <= layout.canvas_height());
            for b in &placements[i + 1..] {
                assert_ne!((a.x, a.y), (b.x, b.y));
                assert!(!overlaps(a, b));
            }
        }
    }

    #[test]
    fn test_uniform_mode_uses_first_image_only() {
        let sizes = vec![
            CellSize::new(50, 40),
            CellSize::new(200, 300),
            CellSize::new(10, 10),
        ];
        let layout = LayoutEngine::new(2, 10, 20).unwrap().compute(&sizes).unwrap();

        assert_eq!(layout.cell(), CellSize::new(50, 40));
        assert_eq!(layout.column_widths(), &[50, 50]);
        assert_eq!(layout.row_heights(), &[40, 40]);
        // Second image (200x300) overflows its 50x40 cell.
        let second = layout.placement(1).unwrap();
        assert_eq!((second.x, second.y), (20, 70));
    }

    #[test]
    fn test_per_track_sizes_from_largest_image() {
        let sizes = vec![
            CellSize::new(50, 40),
            CellSize::new(200, 300),
            CellSize::new(10, 10),
            CellSize::new(80, 20),
        ];
        let layout = LayoutEngine::new(2, 10, 20)
            .unwrap()
            .with_cell_sizing(CellSizing::PerTrack)
            .compute(&sizes)
            .unwrap();

        assert_eq!(layout.column_widths(), &[200, 80]);
        assert_eq!(layout.row_heights(), &[40, 300]);
        assert_eq!(
            layout.canvas_size(),
            (20 + 200 + 10 + 80 + 20, 20 + 40 + 10 + 300 + 20)
        );

        let placements = layout.placements();
        for (i, a) in placements.iter().enumerate() {
            assert!(sizes[i].width <= a.cell_width);
            assert!(sizes[i].height <= a.cell_height);
            for b in &placements[i + 1..] {
                assert!(!overlaps(a, b));
            }
        }
    }

    #[test]
    fn test_per_track_matches_uniform_for_equal_sizes() {
        let sizes = uniform(5, 40, 30);
        let engine = LayoutEngine::new(3, 8, 12).unwrap();
        let uniform_layout = engine.compute(&sizes).unwrap();
        let per_track = engine
            .with_cell_sizing(CellSizing::PerTrack)
            .compute(&sizes)
            .unwrap();

        assert_eq!(uniform_layout.canvas_size(), per_track.canvas_size());
        assert_eq!(uniform_layout.placements(), per_track.placements());
    }

    #[test]
    fn test_empty_images_rejected() {
        let err = LayoutEngine::new(2, 10, 20).unwrap().compute(&[]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidInput(_)));
        assert!(compute_layout(&[], 2, 10, 20).is_err());
    }

    #[test]
    fn test_zero_rows_rejected() {
        let err = LayoutEngine::new(0, 10, 20).unwrap_err();
        assert!(err.to_string().contains("row count"));
    }

    #[test]
    fn test_canvas_overflow_rejected() {
        let sizes = uniform(4, u32::MAX / 2, 10);
        let err = LayoutEngine::new(1, 0, 0).unwrap().compute(&sizes).unwrap_err();
        assert!(err.to_string().contains("canvas width"));
    }

    #[test]
    fn test_huge_row_count_rejected_without_allocating_rows() {
        for sizing in [CellSizing::Uniform, CellSizing::PerTrack] {
            let err = LayoutEngine::new(4_000_000_000, 10, 20)
                .unwrap()
                .with_cell_sizing(sizing)
                .compute(&uniform(1, 100, 100))
                .unwrap_err();
            assert!(err.to_string().contains("canvas height"), "{sizing:?}");
        }
    }

    #[test]
    fn test_placement_outside_grid_is_none() {
        let layout = LayoutEngine::new(2, 0, 0)
            .unwrap()
            .compute(&uniform(3, 10, 10))
            .unwrap();
        assert_eq!(layout.capacity(), 4);
        assert!(layout.placement(3).is_some());
        assert!(layout.placement(4).is_none());
        assert_eq!(layout.placements().len(), 3);
    }

    #[test]
    fn test_compute_layout_from_images() {
        let images = vec![DynamicImage::new_rgb8(100, 100); 4];
        let layout = compute_layout(&images, 2, 10, 20).unwrap();
        assert_eq!(layout.canvas_size(), (250, 250));
    }

    #[test]
    fn test_cell_sizing_parse() {
        assert_eq!(CellSizing::parse("uniform"), Some(CellSizing::Uniform));
        assert_eq!(CellSizing::parse("per-track"), Some(CellSizing::PerTrack));
        assert_eq!(CellSizing::parse("PER_TRACK"), Some(CellSizing::PerTrack));
        assert_eq!(CellSizing::parse("grid"), None);
    }
}
