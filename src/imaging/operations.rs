//! High-level image operations.
//!
//! These functions take configuration, prepare the destination, and call the
//! backend. Neither retries: a failure aborts the current item and the caller
//! decides whether the batch continues.

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, ThumbnailFormat, ThumbnailParams};
use std::fs;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailConfig {
    pub edge: u32,
    pub quality: Quality,
    pub format: ThumbnailFormat,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            edge: 300,
            quality: Quality::default(),
            format: ThumbnailFormat::Webp,
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Copy an original into the asset tree, creating directories as needed.
///
/// Returns the number of bytes copied.
pub fn copy_image(source: &Path, dest: &Path) -> Result<u64> {
    if !source.is_file() {
        return Err(BackendError::SourceNotFound(source.to_path_buf()));
    }
    ensure_parent(dest)?;
    let bytes = fs::copy(source, dest)?;
    log::info!("Copied image {} -> {}", source.display(), dest.display());
    Ok(bytes)
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        edge: config.edge,
        format: config.format,
        quality: config.quality,
    }
}

/// Create a square, center-cropped thumbnail of `source` at `dest`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    dest: &Path,
    config: &ThumbnailConfig,
) -> Result<()> {
    if !source.is_file() {
        return Err(BackendError::SourceNotFound(source.to_path_buf()));
    }
    ensure_parent(dest)?;
    backend.thumbnail(&plan_thumbnail(source, dest, config))?;
    log::info!("Generated thumbnail {}", dest.display());
    Ok(())
}
