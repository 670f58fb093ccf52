//! Curator configuration.
//!
//! An optional `art-curator.toml` in the project root (or any file passed with
//! `--config`) overrides the stock defaults. Files are sparse: only the keys
//! you set are changed, the rest keep their defaults.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "content/art"   # YAML record tree
//! public_dir = "public"         # site root served by the web app
//! asset_prefix = "art"          # asset tree under public_dir
//!
//! [thumbnails]
//! size = 300                    # square edge in pixels
//! quality = 80                  # encoding quality (1-100)
//! format = "webp"               # "webp" or "avif"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ThumbnailConfig, ThumbnailFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the project root when `--config` isn't given.
pub const CONFIG_FILENAME: &str = "art-curator.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    Missing(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CuratorConfig {
    /// Record tree, relative to the project root.
    pub content_dir: String,
    /// Site root, relative to the project root. Record URLs are relative to it.
    pub public_dir: String,
    /// Asset tree under `public_dir`.
    pub asset_prefix: String,
    pub thumbnails: ThumbnailsConfig,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            content_dir: "content/art".to_string(),
            public_dir: "public".to_string(),
            asset_prefix: "art".to_string(),
            thumbnails: ThumbnailsConfig::default(),
        }
    }
}

impl CuratorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_dir.trim().is_empty() || self.public_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_dir and public_dir must not be empty".into(),
            ));
        }
        if self.asset_prefix.trim().is_empty() || Path::new(&self.asset_prefix).is_absolute() {
            return Err(ConfigError::Validation(
                "asset_prefix must be a non-empty relative path".into(),
            ));
        }
        if self.thumbnails.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Thumbnail operation settings derived from this config.
    pub fn thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            edge: self.thumbnails.size,
            quality: Quality::new(self.thumbnails.quality),
            format: self.thumbnails.format,
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Square thumbnail edge in pixels.
    pub size: u32,
    /// Lossy encoding quality, used by AVIF.
    pub quality: u32,
    pub format: ThumbnailFormat,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: 300,
            quality: 80,
            format: ThumbnailFormat::Webp,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CuratorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CuratorConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CuratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the curator config.
///
/// An explicit path must exist. Without one, `art-curator.toml` in `root` is
/// used when present and stock defaults otherwise.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<CuratorConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            Some(read_toml(path)?)
        }
        None => {
            let path = root.join(CONFIG_FILENAME);
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                Some(read_toml(&path)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Fully-commented stock `art-curator.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# art-curator configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Paths are relative to the project root (--root, default ".").
# Unknown keys will cause an error.

# Tree of per-artwork YAML records:
#   <content_dir>/characters/<character>/<slug>.yml
#   <content_dir>/general/<slug>.yml
content_dir = "content/art"

# Site root served by the web application. URLs stored in records are
# relative to this directory (e.g. "/art/general/test-art.png").
public_dir = "public"

# Asset tree under public_dir, mirroring the record tree.
asset_prefix = "art"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Square edge in pixels. Images are scaled to cover and center-cropped.
size = 300

# Lossy encoding quality (1 = smallest, 100 = best).
quality = 80

# Output format: "webp" or "avif".
format = "webp"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = CuratorConfig::default();
        assert_eq!(config.content_dir, "content/art");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.asset_prefix, "art");
        assert_eq!(config.thumbnails.size, 300);
        assert_eq!(config.thumbnails.format, ThumbnailFormat::Webp);
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: CuratorConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, CuratorConfig::default());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config, CuratorConfig::default());
    }

    #[test]
    fn load_config_reads_sparse_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[thumbnails]
format = "avif"
quality = 60
"#,
        )
        .unwrap();

        let config = load_config(tmp.path(), None).unwrap();
        assert_eq!(config.thumbnails.format, ThumbnailFormat::Avif);
        assert_eq!(config.thumbnails.quality, 60);
        // Unspecified values stay at defaults
        assert_eq!(config.thumbnails.size, 300);
        assert_eq!(config.content_dir, "content/art");
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let result = load_config(tmp.path(), Some(&missing));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn explicit_config_path_wins_over_root_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), r#"public_dir = "root""#).unwrap();
        let other = tmp.path().join("other.toml");
        fs::write(&other, r#"public_dir = "www""#).unwrap();

        let config = load_config(tmp.path(), Some(&other)).unwrap();
        assert_eq!(config.public_dir, "www");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "not valid toml [[[").unwrap();
        let result = load_config(tmp.path(), None);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[thumbnails]
size = 300
quality = 80
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[thumbnails]
quality = 50
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let thumbs = merged.get("thumbnails").unwrap();
        assert_eq!(thumbs.get("quality").unwrap().as_integer(), Some(50));
        assert_eq!(thumbs.get("size").unwrap().as_integer(), Some(300));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<CuratorConfig, _> = toml::from_str("contnet_dir = \"x\"");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[thumbnails]
sise = 200
"#,
        )
        .unwrap();
        assert!(load_config(tmp.path(), None).is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let result = resolve_config(Some(
            toml::from_str("[thumbnails]\nformat = \"gif\"").unwrap(),
        ));
        assert!(result.is_err());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = CuratorConfig::default();
        config.thumbnails.quality = 100;
        assert!(config.validate().is_ok());
        config.thumbnails.quality = 0;
        assert!(config.validate().is_err());
        config.thumbnails.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_zero_size() {
        let mut config = CuratorConfig::default();
        config.thumbnails.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_absolute_asset_prefix() {
        let mut config = CuratorConfig::default();
        config.asset_prefix = "/art".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn thumbnail_config_carries_values() {
        let config = CuratorConfig::default();
        let thumbs = config.thumbnail_config();
        assert_eq!(thumbs.edge, 300);
        assert_eq!(thumbs.quality.value(), 80);
        assert_eq!(thumbs.format, ThumbnailFormat::Webp);
    }
}
