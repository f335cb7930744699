//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG) | `image::load_from_memory_with_format` |
//! | Canvas | `image::RgbaImage`, transparent |
//! | Scale | `image::imageops::resize` with `Lanczos3` filter |
//! | Draw | `image::imageops::overlay` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (quality ignored) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//!
//! JPEG has no alpha channel, so the uncovered border of the canvas comes
//! out black in JPEG thumbnails and transparent in PNG ones.

use super::backend::{BackendError, DecodedImage, ImageBackend};
use super::params::ThumbnailParams;
use crate::media::MediaType;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

/// Backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the source into its placement on a transparent canvas.
fn draw(image: &DynamicImage, params: &ThumbnailParams) -> RgbaImage {
    let mut canvas = RgbaImage::new(params.canvas_width, params.canvas_height);
    let placement = params.placement;

    let scaled = if (image.width(), image.height()) == (placement.width, placement.height) {
        image.to_rgba8()
    } else {
        imageops::resize(
            &image.to_rgba8(),
            placement.width,
            placement.height,
            FilterType::Lanczos3,
        )
    };

    imageops::overlay(&mut canvas, &scaled, placement.x, placement.y);
    canvas
}

fn encode(canvas: RgbaImage, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError> {
    let (width, height) = canvas.dimensions();
    let mut buf = Vec::new();

    match params.media_type {
        MediaType::Png => PngEncoder::new(&mut buf)
            .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?,
        MediaType::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, params.quality.value() as u8)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?
        }
    }

    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], media_type: MediaType) -> Result<DecodedImage, BackendError> {
        let format = media_type.image_format();
        if !format.reading_enabled() {
            return Err(BackendError::Unsupported(format!(
                "no decoder compiled in for {media_type}"
            )));
        }
        image::load_from_memory_with_format(bytes, format)
            .map(DecodedImage::new)
            .map_err(|e| BackendError::Decode(format!("{media_type}: {e}")))
    }

    fn render(
        &self,
        image: &DecodedImage,
        params: &ThumbnailParams,
    ) -> Result<Vec<u8>, BackendError> {
        if !params.media_type.image_format().writing_enabled() {
            return Err(BackendError::Unsupported(format!(
                "no encoder compiled in for {}",
                params.media_type
            )));
        }
        let canvas = draw(image.pixels(), params);
        encode(canvas, params)
    }
}
