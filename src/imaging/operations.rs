//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, DecodedImage, Dimensions, ImageBackend};
use super::calculations::compute_fit;
use super::params::{Placement, Quality, ThumbnailParams};
use crate::media::MediaType;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSettings {
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
            quality: Quality::default(),
        }
    }
}

/// Plan a thumbnail render without executing it.
pub fn plan_thumbnail(
    source: Dimensions,
    media_type: MediaType,
    settings: &ThumbnailSettings,
) -> ThumbnailParams {
    let fit = compute_fit(source.width, source.height, settings.width, settings.height);

    ThumbnailParams {
        canvas_width: settings.width,
        canvas_height: settings.height,
        placement: Placement::from_fit(fit),
        quality: settings.quality,
        media_type,
    }
}

/// Render a decoded image into an encoded thumbnail of `media_type`.
///
/// The canvas is always `settings.width × settings.height`; the image is
/// scaled down to fit and centered on it.
pub fn render_thumbnail(
    backend: &impl ImageBackend,
    image: &DecodedImage,
    media_type: MediaType,
    settings: &ThumbnailSettings,
) -> Result<Vec<u8>> {
    let params = plan_thumbnail(image.dimensions(), media_type, settings);
    backend.render(image, &params)
}
