//! Accepted media types and the data-URI form used for stored thumbnails.
//!
//! Only two types are accepted by the ingestion pipeline:
//!
//! | Mime | Decoder / encoder |
//! |---|---|
//! | `image/png` | `image::codecs::png` |
//! | `image/jpeg` | `image::codecs::jpeg` |
//!
//! Everything else is rejected per file with `UnsupportedFileType`.
//!
//! Thumbnails are persisted as `data:<mime>;base64,<payload>` strings, the same
//! shape a browser's `toDataURL` produces, so a stored value is self-describing
//! and can be dropped straight into an `<img src>`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use std::fmt;
use thiserror::Error;

/// A media type on the ingestion whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Png,
    Jpeg,
}

/// The whitelist, in the order it is documented.
pub const SUPPORTED_MEDIA_TYPES: &[MediaType] = &[MediaType::Png, MediaType::Jpeg];

impl MediaType {
    /// Match a declared mime string against the whitelist.
    ///
    /// Matching is exact, as a file picker reports it: `image/jpg` or
    /// `IMAGE/PNG` are not on the list.
    pub fn from_mime(mime: &str) -> Option<Self> {
        SUPPORTED_MEDIA_TYPES
            .iter()
            .copied()
            .find(|t| t.as_mime() == mime)
    }

    pub fn as_mime(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            MediaType::Png => ImageFormat::Png,
            MediaType::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a data URI")]
    MissingScheme,
    #[error("data URI is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(String),
}

/// Encode bytes as a base64 data URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 data URI into its mime type and decoded bytes.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>), DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingScheme)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| DataUriError::Payload(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}
