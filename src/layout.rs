//! Where records and assets live on disk, and how disk paths become site URLs.
//!
//! ```text
//! <root>/
//! ├── content/art/                     # records (content_dir)
//! │   ├── characters/<character>/<slug>.yml
//! │   └── general/<slug>.yml
//! └── public/                          # site root (public_dir)
//!     └── art/                         # asset_prefix
//!         ├── characters/<character>/
//!         │   ├── <id>.png
//!         │   ├── <id>__<variant>.png
//!         │   └── thumbnails/<id>.webp
//!         └── general/...
//! ```
//!
//! Records never store local paths. A file at `public/art/general/x.png`
//! is recorded as `/art/general/x.png`, and turned back into a disk path by
//! joining it onto the public root.

use crate::config::CuratorConfig;
use crate::types::Category;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Path is outside the public root: {0}")]
    OutsidePublicRoot(PathBuf),
}

const THUMBNAILS_DIR: &str = "thumbnails";

/// Resolved directory layout for one project root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    content_dir: PathBuf,
    public_dir: PathBuf,
    asset_dir: PathBuf,
}

/// Destination for one category's originals and thumbnails.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDir {
    pub originals: PathBuf,
    pub thumbnails: PathBuf,
}

impl AssetDir {
    /// File stems already present among the originals or thumbnails.
    ///
    /// A directory that doesn't exist yet contributes nothing.
    pub fn taken_stems(&self) -> HashSet<String> {
        [&self.originals, &self.thumbnails]
            .into_iter()
            .filter_map(|dir| fs::read_dir(dir).ok())
            .flatten()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| {
                Path::new(&entry.file_name())
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .collect()
    }
}

impl StoreLayout {
    pub fn new(root: &Path, config: &CuratorConfig) -> Self {
        let public_dir = root.join(&config.public_dir);
        Self {
            content_dir: root.join(&config.content_dir),
            asset_dir: public_dir.join(&config.asset_prefix),
            public_dir,
        }
    }

    /// Root of the record tree.
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Root of the public art asset tree.
    pub fn asset_root(&self) -> &Path {
        &self.asset_dir
    }

    /// Path of the record for `slug` in `category`.
    pub fn record_path(&self, category: &Category, slug: &str) -> PathBuf {
        category_dir(&self.content_dir, category).join(format!("{slug}.yml"))
    }

    pub fn asset_dir(&self, category: &Category) -> AssetDir {
        let originals = category_dir(&self.asset_dir, category);
        AssetDir {
            thumbnails: originals.join(THUMBNAILS_DIR),
            originals,
        }
    }

    /// Site-root-relative URL for a file under the public root.
    pub fn site_url(&self, path: &Path) -> Result<String, LayoutError> {
        let rel = path
            .strip_prefix(&self.public_dir)
            .map_err(|_| LayoutError::OutsidePublicRoot(path.to_path_buf()))?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(format!("/{}", parts.join("/")))
    }

    /// Disk path for a recorded site URL.
    ///
    /// Returns `None` for URLs that would escape the public root (`..`) or
    /// that aren't site-root-relative.
    pub fn disk_path(&self, url: &str) -> Option<PathBuf> {
        let rel = Path::new(url.strip_prefix('/')?);
        if rel.as_os_str().is_empty()
            || rel
                .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.public_dir.join(rel))
    }

    /// Thumbnail path for an original under the asset tree:
    /// `<dir>/<stem>.<ext>` → `<dir>/thumbnails/<stem>.<thumb_ext>`.
    pub fn thumbnail_for(original: &Path, thumb_ext: &str) -> Option<PathBuf> {
        let stem = original.file_stem()?;
        let dir = original.parent()?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(thumb_ext);
        Some(dir.join(THUMBNAILS_DIR).join(name))
    }

    /// Whether `path` sits inside a thumbnails directory.
    pub fn is_thumbnail(path: &Path) -> bool {
        path.parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == THUMBNAILS_DIR)
    }
}

fn category_dir(base: &Path, category: &Category) -> PathBuf {
    match category {
        Category::Character(character) => base.join("characters").join(character),
        Category::General => base.join("general"),
    }
}
