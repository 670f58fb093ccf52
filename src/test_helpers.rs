//! Shared test utilities.
//!
//! Fixture builders for source images, records, and asset files, all rooted
//! in a caller-owned temp directory.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let sources = touch_sources(tmp.path(), &["img1.png", "img2.png"]);
//! let entry = sample_entry("test-art", &["test-art", "test-art-2"]);
//! for url in entry.asset_urls() {
//!     write_asset(tmp.path(), &url);
//! }
//! ```

use crate::types::{ArtEntry, ArtImage, ArtImageVariant};
use chrono::{TimeZone, Utc};
use image::RgbImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =========================================================================
// Source files
// =========================================================================

/// Write a real PNG with a gradient so resizes have something to chew on.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Create placeholder source files (not decodable) for flows that run
/// against the mock backend. Returns their paths in order.
pub fn touch_sources(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join("incoming").join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, name.as_bytes()).unwrap();
            path
        })
        .collect()
}

/// Create the file behind a site URL under `<root>/public`.
pub fn write_asset(root: &Path, url: &str) -> PathBuf {
    let path = root.join("public").join(url.trim_start_matches('/'));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"asset").unwrap();
    path
}

// =========================================================================
// Records
// =========================================================================

/// A general-category entry with one image per id. Each image has a
/// thumbnail; the first also carries one labelled variant.
pub fn sample_entry(slug: &str, ids: &[&str]) -> ArtEntry {
    let images = ids
        .iter()
        .enumerate()
        .map(|(i, id)| ArtImage {
            id: id.to_string(),
            title: None,
            alt: None,
            image_url: format!("/art/general/{id}.png"),
            thumbnail_url: Some(format!("/art/general/thumbnails/{id}.webp")),
            variants: if i == 0 {
                vec![ArtImageVariant {
                    image_url: format!("/art/general/{id}__blue.png"),
                    thumbnail_url: Some(format!("/art/general/thumbnails/{id}__blue.webp")),
                    label: Some("blue".into()),
                    alt: None,
                }]
            } else {
                Vec::new()
            },
        })
        .collect();

    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    ArtEntry {
        slug: slug.to_string(),
        created_at: stamp,
        modified_at: stamp,
        title: format!("Title of {slug}"),
        description: None,
        tags: Vec::new(),
        character: None,
        related_characters: Vec::new(),
        pinned: false,
        sketch: false,
        images,
        extra: BTreeMap::new(),
    }
}

/// Find an image by id. Panics with the available ids if missing.
pub fn find_image<'a>(entry: &'a ArtEntry, id: &str) -> &'a ArtImage {
    entry.image(id).unwrap_or_else(|| {
        let ids: Vec<&str> = entry.images.iter().map(|i| i.id.as_str()).collect();
        panic!("image '{id}' not found. Available: {ids:?}")
    })
}
