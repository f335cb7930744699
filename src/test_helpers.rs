//! Shared test utilities for the thumbdrop test suite.
//!
//! Provides encoded image fixtures and a presenter that records what reached
//! presentation.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let presenter = Arc::new(RecordingPresenter::default());
//! let bytes = png_bytes(400, 200);
//! // ...run the pipeline with `presenter` as presenter and reset control...
//! assert_eq!(presenter.presented().len(), 1);
//! assert_eq!(presenter.shown_count(), 1);
//! ```

use crate::diagnostics::PipelineEvent;
use crate::presentation::{PresentedThumbnail, Presenter, ResetControl};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::UnboundedReceiver;

// =========================================================================
// Image fixtures
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// A real PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A real JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

// =========================================================================
// Presentation
// =========================================================================

/// Records presented thumbnails and reset-control toggles.
#[derive(Default)]
pub struct RecordingPresenter {
    items: Mutex<Vec<PresentedThumbnail>>,
    shown: AtomicUsize,
    hidden: AtomicUsize,
    cleared: AtomicUsize,
}

impl RecordingPresenter {
    pub fn presented(&self) -> Vec<PresentedThumbnail> {
        self.items.lock().unwrap().clone()
    }

    /// Times the reset control was made visible.
    pub fn shown_count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.load(Ordering::SeqCst)
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, item: PresentedThumbnail) {
        self.items.lock().unwrap().push(item);
    }

    fn clear(&self) {
        self.items.lock().unwrap().clear();
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

impl ResetControl for RecordingPresenter {
    fn set_visible(&self, visible: bool) {
        let counter = if visible { &self.shown } else { &self.hidden };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

// =========================================================================
// Diagnostics
// =========================================================================

/// Everything currently queued on a diagnostics receiver.
pub fn drain_events(rx: &mut UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
