//! Parameter types for thumbnail rendering.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between [`operations`](super::operations) (which decides the geometry) and
//! the [`backend`](super::backend) (which does the pixel work), so the
//! geometry can be tested against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`Placement`]: Integer rectangle the source is drawn into.
//! - [`ThumbnailParams`]: Canvas size, placement, quality and output type.

use super::calculations::Fit;
use crate::media::MediaType;

/// Quality setting for lossy image encoding (1-100).
///
/// 50 is the thumbnail default, i.e. `0.5` on a 0–1 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(50)
    }
}

/// Pixel rectangle on the thumbnail canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Round a fractional fit to whole pixels. Sizes never drop below 1px.
    pub fn from_fit(fit: Fit) -> Self {
        Self {
            x: fit.x.round() as i64,
            y: fit.y.round() as i64,
            width: (fit.width.round() as u32).max(1),
            height: (fit.height.round() as u32).max(1),
        }
    }
}

/// Full specification for one thumbnail render.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub placement: Placement,
    pub quality: Quality,
    pub media_type: MediaType,
}
