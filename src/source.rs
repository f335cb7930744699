//! File candidates: what a drop zone or file picker hands the pipeline.
//!
//! A candidate is the raw bytes of one file plus the media type it *declares*.
//! The declaration is taken at face value; the pipeline checks it against the
//! whitelist and the decoder finds out if it was a lie. For files read from
//! disk the declared type is derived from the extension, the way a browser
//! fills in `File.type`.

use image::ImageFormat;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Declared type for files whose extension maps to nothing known.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file asynchronously.
    pub async fn read(path: &Path) -> io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, declared_media_type(path), bytes))
    }
}

/// Media type a file declares by its extension.
pub fn declared_media_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE)
}

/// Expand paths into files: directories are walked recursively (sorted,
/// dotfiles skipped), plain files pass through.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let walker = WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|e| e.ok());

        for entry in walker {
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
