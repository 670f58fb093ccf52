//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They sit between the
//! [`operations`](super::operations) module, which decides where thumbnails go,
//! and the [`backend`](super::backend), which does the pixel work. A mock
//! backend can then stand in for tests without touching operation logic.
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//! - [`ThumbnailFormat`]: output encoding, which also fixes the file extension.
//! - [`ThumbnailParams`]: one thumbnail job (source, output, edge, format, quality).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
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
        Self(80)
    }
}

/// Encoding used for generated thumbnails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    #[default]
    Webp,
    Avif,
}

impl ThumbnailFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ThumbnailFormat::Webp => "webp",
            ThumbnailFormat::Avif => "avif",
        }
    }
}

/// Parameters for a thumbnail operation (cover-resize + center crop to a square).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Edge of the square output in pixels.
    pub edge: u32,
    pub format: ThumbnailFormat,
    pub quality: Quality,
}
