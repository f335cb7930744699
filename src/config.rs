//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the config directory overrides any
//! subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnails]
//! width = 150               # Canvas width in pixels
//! height = 150              # Canvas height in pixels
//! quality = 50              # Encoder quality (1-100)
//!
//! [store]
//! dir = ".thumbdrop"        # Directory holding the store file
//! name = "thumbnails"       # Store file is <dir>/<name>.sqlite3
//! version = 1               # Schema version requested at open
//!
//! [keys]
//! prefix = "thumbdrop"      # Keys look like <prefix>_<millis><1-100>:<mime>
//!
//! [diagnostics]
//! enabled = true            # Report pipeline events and failures
//!
//! [capabilities]
//! file_reading = true       # Set false to refuse to start
//! persistent_store = true   # Set false to refuse to start
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ThumbnailSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Thumbnail canvas and encoder settings.
    pub thumbnails: ThumbnailsConfig,
    /// Where the persistent store lives and which version it expects.
    pub store: StoreConfig,
    pub keys: KeysConfig,
    pub diagnostics: DiagnosticsConfig,
    /// Switches that gate startup.
    pub capabilities: CapabilitiesConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.width == 0 || self.thumbnails.height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width and thumbnails.height must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.store.name.is_empty() {
            return Err(ConfigError::Validation(
                "store.name must not be empty".into(),
            ));
        }
        if self.store.version == 0 {
            return Err(ConfigError::Validation(
                "store.version must be at least 1".into(),
            ));
        }
        if self.keys.prefix.is_empty() || self.keys.prefix.contains(':') {
            return Err(ConfigError::Validation(
                "keys.prefix must be non-empty and must not contain ':'".into(),
            ));
        }
        Ok(())
    }

    pub fn thumbnail_settings(&self) -> ThumbnailSettings {
        ThumbnailSettings {
            width: self.thumbnails.width,
            height: self.thumbnails.height,
            quality: Quality::new(self.thumbnails.quality),
        }
    }

    pub fn store_dir(&self) -> PathBuf {
        PathBuf::from(&self.store.dir)
    }
}

/// Thumbnail canvas and encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub width: u32,
    pub height: u32,
    /// Encoder quality, 1-100. Only JPEG output uses it.
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        let settings = ThumbnailSettings::default();
        Self {
            width: settings.width,
            height: settings.height,
            quality: settings.quality.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub dir: String,
    pub name: String,
    pub version: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: ".thumbdrop".to_string(),
            name: "thumbnails".to_string(),
            version: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    pub prefix: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            prefix: crate::pipeline::DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilitiesConfig {
    pub file_reading: bool,
    pub persistent_store: bool,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            file_reading: true,
            persistent_store: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Thumbdrop Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Every thumbnail is rendered onto a canvas of exactly this size.
# The source is scaled down (never up) to fit and centered.
width = 150
height = 150

# Encoder quality, 1-100. Applies to JPEG thumbnails.
quality = 50

# ---------------------------------------------------------------------------
# Persistent store
# ---------------------------------------------------------------------------
[store]
# The store is a single SQLite file at <dir>/<name>.sqlite3.
dir = ".thumbdrop"
name = "thumbnails"

# Schema version. Raising it upgrades an existing store in place.
# Opening a store written by a newer version is refused.
version = 1

# ---------------------------------------------------------------------------
# Keys
# ---------------------------------------------------------------------------
[keys]
# Keys look like <prefix>_<epoch millis><random 1-100>:<media type>.
prefix = "thumbdrop"

# ---------------------------------------------------------------------------
# Diagnostics
# ---------------------------------------------------------------------------
[diagnostics]
# Report presented/persisted thumbnails and per-file failures.
enabled = true

# ---------------------------------------------------------------------------
# Capabilities
# ---------------------------------------------------------------------------
[capabilities]
# Startup fails with "not supported" if any of these is false.
file_reading = true
persistent_store = true
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_thumbnail_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.thumbnails.width, 150);
        assert_eq!(config.thumbnails.height, 150);
        assert_eq!(config.thumbnails.quality, 50);
        assert_eq!(config.thumbnail_settings(), ThumbnailSettings::default());
    }

    #[test]
    fn default_store_and_keys() {
        let config = AppConfig::default();
        assert_eq!(config.store.name, "thumbnails");
        assert_eq!(config.store.version, 1);
        assert_eq!(config.keys.prefix, "thumbdrop");
        assert!(config.diagnostics.enabled);
        assert!(config.capabilities.file_reading);
        assert!(config.capabilities.persistent_store);
    }

    #[test]
    fn parse_partial_config() {
        let config: AppConfig = toml::from_str(
            r#"
[thumbnails]
width = 200
"#,
        )
        .unwrap();
        assert_eq!(config.thumbnails.width, 200);
        assert_eq!(config.thumbnails.height, 150);
        assert_eq!(config.store, StoreConfig::default());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[store]
dir = "/var/cache/thumbs"
version = 3

[diagnostics]
enabled = false
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.store.dir, "/var/cache/thumbs");
        assert_eq!(config.store.version, 3);
        assert_eq!(config.store.name, "thumbnails");
        assert!(!config.diagnostics.enabled);
        assert_eq!(config.store_dir(), PathBuf::from("/var/cache/thumbs"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[thumbnails]
width = 150
height = 150
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[thumbnails]
width = 64
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let thumbs = merged.get("thumbnails").unwrap();
        assert_eq!(thumbs.get("width").unwrap().as_integer(), Some(64));
        assert_eq!(thumbs.get("height").unwrap().as_integer(), Some(150));
    }

    #[test]
    fn merge_toml_scalar_replaces_table() {
        let base: toml::Value = toml::from_str("[a]\nb = 1").unwrap();
        let overlay: toml::Value = toml::from_str("a = 2").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(2));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[store]\nnmae = \"x\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[thumbs]\nwidth = 1");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[keys]\npreffix = \"x\"").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = AppConfig::default();
        config.thumbnails.quality = 100;
        assert!(config.validate().is_ok());
        config.thumbnails.quality = 1;
        assert!(config.validate().is_ok());

        config.thumbnails.quality = 0;
        assert!(config.validate().unwrap_err().to_string().contains("quality"));
        config.thumbnails.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_canvas() {
        let mut config = AppConfig::default();
        config.thumbnails.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_store_fields() {
        let mut config = AppConfig::default();
        config.store.version = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.store.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_prefix_without_colon() {
        let mut config = AppConfig::default();
        config.keys.prefix = "a:b".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[thumbnails]\nquality = 500").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
