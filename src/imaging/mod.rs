//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory_with_format` |
//! | **Fit** | [`compute_fit`] (pure arithmetic) |
//! | **Thumbnail** | `resize` + `overlay` onto a fixed canvas, PNG/JPEG encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, DecodedImage, Dimensions, ImageBackend};
pub use calculations::{Fit, compute_fit};
pub use operations::{ThumbnailSettings, plan_thumbnail, render_thumbnail};
pub use params::{Placement, Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
