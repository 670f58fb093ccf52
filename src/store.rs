//! YAML record store.
//!
//! There is no index. Every lookup walks the record tree (sorted by file
//! name, so results are stable) and parses files until a slug matches. For
//! a personal archive of a few hundred records this is fast enough and can
//! never go stale.
//!
//! Deletion of asset files is best-effort: each referenced file becomes one
//! task whose outcome is collected in a [`DeletionReport`] instead of
//! stopping the operation.

use crate::gallery::IdAllocator;
use crate::layout::StoreLayout;
use crate::types::{ArtEntry, ArtSummary};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("No art entry with slug '{0}'")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    AlreadyExists(PathBuf),
}

/// A loaded record and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    pub path: PathBuf,
    pub entry: ArtEntry,
}

/// What happened to one file in a best-effort deletion.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletionOutcome {
    Removed,
    Missing,
    Failed(String),
}

impl Found {
    pub fn summary(&self) -> ArtSummary {
        ArtSummary {
            slug: self.entry.slug.clone(),
            title: self.entry.title.clone(),
            image_count: self.entry.images.len(),
            path: self.path.display().to_string(),
        }
    }
}

/// Per-file outcomes of a best-effort deletion, keyed by site URL.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeletionReport {
    pub tasks: Vec<(String, DeletionOutcome)>,
}

impl DeletionReport {
    fn count(&self, pred: impl Fn(&DeletionOutcome) -> bool) -> usize {
        self.tasks.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn removed(&self) -> usize {
        self.count(|o| *o == DeletionOutcome::Removed)
    }

    pub fn missing(&self) -> usize {
        self.count(|o| *o == DeletionOutcome::Missing)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeletionOutcome::Failed(_)))
    }
}

pub struct ArtStore {
    layout: StoreLayout,
}

impl ArtStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Every `.yml`/`.yaml` file under the record root, sorted by file name.
    pub fn record_files(&self) -> Vec<PathBuf> {
        WalkDir::new(self.layout.content_dir())
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "yml" || e == "yaml")
            })
            .collect()
    }

    /// Locate the record whose `slug` field equals `slug`.
    pub fn find_by_slug(&self, slug: &str) -> Result<Found, StoreError> {
        self.parsed_records()
            .find(|found| found.entry.slug == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    /// Every record that parses. Broken files are skipped.
    pub fn list_entries(&self) -> Vec<Found> {
        self.parsed_records().collect()
    }

    /// One summary row per parseable record.
    pub fn list(&self) -> Vec<ArtSummary> {
        self.parsed_records()
            .map(|found| found.summary())
            .collect()
    }

    fn parsed_records(&self) -> impl Iterator<Item = Found> + '_ {
        self.record_files()
            .into_iter()
            .filter_map(|path| match load_record(&path) {
                Ok(entry) => Some(Found { path, entry }),
                Err(e) => {
                    log::debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            })
    }

    /// Write a new record at `path`. Never overwrites.
    pub fn create(&self, entry: &ArtEntry, path: &Path) -> Result<(), StoreError> {
        if path.exists() {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = to_yaml(entry, path)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_path_buf()),
                _ => StoreError::Io(e),
            })?;
        file.write_all(yaml.as_bytes())?;
        log::info!("Created YAML file: {}", path.display());
        Ok(())
    }

    /// Stamp `modified_at` and overwrite the record.
    pub fn save(&self, found: &mut Found) -> Result<(), StoreError> {
        found.entry.modified_at = Utc::now();
        let yaml = to_yaml(&found.entry, &found.path)?;
        fs::write(&found.path, yaml)?;
        log::debug!("Saved {}", found.path.display());
        Ok(())
    }

    /// Give every image an id, deriving missing ones from the asset file
    /// name (`/art/general/sunset.png` → `sunset`) or `image-N` by position.
    ///
    /// Saves and returns `true` only if something changed.
    pub fn ensure_image_ids(&self, found: &mut Found) -> Result<bool, StoreError> {
        let existing: Vec<String> = found.entry.image_ids().map(String::from).collect();
        let mut ids = IdAllocator::new(existing);
        let mut changed = false;
        for (idx, image) in found.entry.images.iter_mut().enumerate() {
            if !image.id.is_empty() {
                continue;
            }
            let stem = url_stem(&image.image_url);
            image.id = if stem.is_empty() {
                ids.claim(&format!("image-{}", idx + 1))
            } else {
                ids.claim(stem)
            };
            log::info!("Backfilled image id {}", image.id);
            changed = true;
        }
        if changed {
            self.save(found)?;
        }
        Ok(changed)
    }

    /// Remove a record and, with `cascade`, every asset it references.
    ///
    /// Assets go first; a failure on one never stops the rest or the record
    /// removal.
    pub fn delete(&self, found: &Found, cascade: bool) -> Result<DeletionReport, StoreError> {
        let report = if cascade {
            self.remove_assets(&found.entry.asset_urls())
        } else {
            DeletionReport::default()
        };
        fs::remove_file(&found.path)?;
        log::info!("Deleted art {}", found.entry.slug);
        Ok(report)
    }

    /// Best-effort removal of the files behind `urls`.
    pub fn remove_assets(&self, urls: &[String]) -> DeletionReport {
        let tasks = urls
            .iter()
            .map(|url| (url.clone(), self.remove_asset(url)))
            .collect();
        DeletionReport { tasks }
    }

    fn remove_asset(&self, url: &str) -> DeletionOutcome {
        let Some(path) = self.layout.disk_path(url) else {
            log::warn!("Not a site path, leaving alone: {url}");
            return DeletionOutcome::Failed("not a site-relative path".into());
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed {}", path.display());
                DeletionOutcome::Removed
            }
            Err(e) if e.kind() == ErrorKind::NotFound => DeletionOutcome::Missing,
            Err(e) => {
                log::warn!("Could not remove {}: {}", path.display(), e);
                DeletionOutcome::Failed(e.to_string())
            }
        }
    }
}

fn load_record(path: &Path) -> Result<ArtEntry, StoreError> {
    let raw = fs::read_to_string(path)?;
    serde_yaml::from_str(&raw).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn to_yaml(entry: &ArtEntry, path: &Path) -> Result<String, StoreError> {
    serde_yaml::to_string(entry).map_err(|source| StoreError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// File name of a URL without its extension.
fn url_stem(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or("");
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            stem
        }
        _ => name,
    }
}
