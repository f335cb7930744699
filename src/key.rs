//! Thumbnail keys.
//!
//! A key looks like `thumbdrop_171803123456742:image/png`: the app prefix, an
//! underscore, the epoch-millisecond timestamp immediately followed by a
//! random disambiguator in `1..=100`, a colon, then the declared media type of
//! the source file. The media type is recoverable from the key alone, which the
//! cache loader relies on.
//!
//! Uniqueness is probabilistic. Two keys generated in the same millisecond
//! collide with probability 1/100, and a colliding `put` overwrites the
//! earlier thumbnail.

use rand::Rng;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThumbnailKey(String);

impl ThumbnailKey {
    /// Generate a fresh key for a file of the given declared media type.
    pub fn generate(prefix: &str, media_type: &str) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let disambiguator: u32 = rand::thread_rng().gen_range(1..=100);
        Self::from_parts(prefix, millis, disambiguator, media_type)
    }

    fn from_parts(prefix: &str, millis: u128, disambiguator: u32, media_type: &str) -> Self {
        Self(format!("{prefix}_{millis}{disambiguator}:{media_type}"))
    }

    /// Media type encoded after the first `:`, if any.
    pub fn media_type(&self) -> Option<&str> {
        self.0.split(':').nth(1).filter(|t| !t.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ThumbnailKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ThumbnailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
