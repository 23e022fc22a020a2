//! Pixel composition: pastes images onto a white canvas at their placements.

use image::{imageops, DynamicImage, Rgb, RgbImage};

use crate::error::LayoutError;
use crate::layout::LayoutSpec;

/// Canvas background colour.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// An owned RGB pixel buffer being composed.
///
/// Created by [`CollageRenderer::render`] and handed by value to the
/// persister, so nothing else can hold it while it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    buffer: RgbImage,
}

impl Canvas {
    /// Allocate a canvas filled with [`BACKGROUND`].
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Pixel at `(x, y)`. Panics if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.buffer.get_pixel(x, y)
    }

    /// Raw interleaved RGB bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Borrow the underlying buffer.
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Consume the canvas, returning the underlying buffer.
    pub fn into_image(self) -> RgbImage {
        self.buffer
    }

    /// Replace the pixels under `image` with its own, top-left at `(x, y)`.
    ///
    /// Parts of `image` outside the canvas are clipped. The image is converted
    /// to RGB first; any alpha channel is dropped rather than blended.
    pub fn paste(&mut self, image: &DynamicImage, x: u32, y: u32) {
        let (x, y) = (i64::from(x), i64::from(y));
        match image {
            DynamicImage::ImageRgb8(rgb) => imageops::replace(&mut self.buffer, rgb, x, y),
            other => imageops::replace(&mut self.buffer, &other.to_rgb8(), x, y),
        }
    }
}

/// Paints a sequence of images onto a canvas following a [`LayoutSpec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CollageRenderer;

impl CollageRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Compose `images` in input order.
    ///
    /// Later pastes overwrite earlier pixels where an image is larger than
    /// its cell. Fails if `images` is empty or does not fit the grid.
    pub fn render(
        &self,
        images: &[DynamicImage],
        layout: &LayoutSpec,
    ) -> Result<Canvas, LayoutError> {
        if images.is_empty() {
            return Err(LayoutError::invalid("nothing to render: no images"));
        }
        if images.len() > layout.capacity() {
            return Err(LayoutError::invalid(format!(
                "{} images do not fit a {}x{} grid",
                images.len(),
                layout.columns(),
                layout.rows()
            )));
        }

        let mut canvas = Canvas::blank(layout.canvas_width(), layout.canvas_height());
        for (index, image) in images.iter().enumerate() {
            let Some(placement) = layout.placement(index) else {
                continue;
            };
            tracing::trace!(
                "Paste image {} ({}x{}) at column {}, row {} -> ({}, {})",
                index,
                image.width(),
                image.height(),
                placement.column,
                placement.row,
                placement.x,
                placement.y
            );
            canvas.paste(image, placement.x, placement.y);
        }

        tracing::debug!(
            "Rendered {} image(s) onto {}x{} canvas",
            images.len(),
            canvas.width(),
            canvas.height()
        );
        Ok(canvas)
    }
}
