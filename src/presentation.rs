//! Seams to whatever shows thumbnails and supplies files.
//!
//! The pipeline and the cache loader only talk to these traits. The CLI backs
//! them with an HTML [`Gallery`](crate::gallery::Gallery); a GUI would back
//! them with its own widgets.

use crate::key::ThumbnailKey;
use crate::media::MediaType;

/// A thumbnail ready to be shown, wrapped in a link to the full image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedThumbnail {
    pub key: ThumbnailKey,
    pub media_type: MediaType,
    /// Data-URI of the encoded thumbnail.
    pub thumbnail: String,
    /// Data-URI the link points at: the full source image for fresh files,
    /// the stored thumbnail itself for replayed ones.
    pub link: String,
    pub width: u32,
    pub height: u32,
}

/// The container thumbnails are appended to.
pub trait Presenter: Send + Sync {
    fn present(&self, item: PresentedThumbnail);

    /// Remove everything presented so far.
    fn clear(&self);
}

/// The "clear all" affordance.
pub trait ResetControl: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// Somewhere files come from: a drop zone or a file picker.
pub trait InputSurface: Send + Sync {
    fn label(&self) -> &str;

    /// Called after a batch from this surface has been read, so the same
    /// selection can be made again.
    fn acknowledge(&self) {}
}

/// An input surface known only by its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSurface {
    label: String,
}

impl LabeledSurface {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl InputSurface for LabeledSurface {
    fn label(&self) -> &str {
        &self.label
    }
}
