//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! decode file bytes into a raster, and render a raster into an encoded
//! thumbnail. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use the recording
//! mock in this module.

use super::params::ThumbnailParams;
use crate::media::MediaType;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Rendering not supported: {0}")]
    Unsupported(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded raster, owned by the render step and dropped after it.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: DynamicImage,
}

impl DecodedImage {
    pub fn new(pixels: DynamicImage) -> Self {
        Self { pixels }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

/// Trait for image backends.
///
/// Implementations must be shareable across tasks: the pipeline hands one
/// backend to every per-file task and calls it from blocking workers.
pub trait ImageBackend: Send + Sync + 'static {
    /// Decode encoded file bytes of the given type.
    fn decode(&self, bytes: &[u8], media_type: MediaType) -> Result<DecodedImage, BackendError>;

    /// Draw `image` onto a fresh canvas and encode it.
    ///
    /// Must return [`BackendError::Unsupported`] when the requested output
    /// type cannot be encoded, never an empty buffer.
    fn render(
        &self,
        image: &DecodedImage,
        params: &ThumbnailParams,
    ) -> Result<Vec<u8>, BackendError>;
}
