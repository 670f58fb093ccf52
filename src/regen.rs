//! Bulk thumbnail regeneration.
//!
//! Walks the public art tree (skipping `thumbnails/` directories), rebuilds
//! the thumbnail of every decodable original, and points records at the
//! result. A thumbnail whose mtime is at least its original's is considered
//! current and left alone unless `force` is set. `dry_run` only reports what
//! would be regenerated.
//!
//! Failures are per item: a file that can't be decoded or a record that can't
//! be saved bumps the error count and the run continues.

use crate::imaging::{self, ImageBackend, ThumbnailConfig};
use crate::layout::StoreLayout;
use crate::store::ArtStore;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegenOptions {
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegenReport {
    /// Originals found under the asset tree.
    pub found: usize,
    pub processed: usize,
    /// Thumbnails already current.
    pub skipped: usize,
    pub errors: usize,
    pub records_updated: usize,
    /// Originals a dry run would regenerate.
    pub planned: Vec<PathBuf>,
}

/// Originals under the asset root that `backend` can decode, sorted.
pub fn find_originals(layout: &StoreLayout, backend: &impl ImageBackend) -> Vec<PathBuf> {
    WalkDir::new(layout.asset_root())
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !StoreLayout::is_thumbnail(p))
        .filter(|p| {
            let ok = backend.can_decode(p);
            if !ok {
                log::debug!("Skipping non-image {}", p.display());
            }
            ok
        })
        .collect()
}

/// Whether `thumb` exists and is at least as new as `original`.
fn is_current(original: &Path, thumb: &Path) -> bool {
    let mtime = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (mtime(original), mtime(thumb)) {
        (Some(orig), Some(th)) => th >= orig,
        _ => false,
    }
}

pub fn regenerate_thumbnails(
    store: &ArtStore,
    backend: &impl ImageBackend,
    config: &ThumbnailConfig,
    options: RegenOptions,
) -> RegenReport {
    let layout = store.layout();
    let originals = find_originals(layout, backend);
    let mut report = RegenReport {
        found: originals.len(),
        ..RegenReport::default()
    };
    // image_url -> thumbnail_url for every original that ends with a thumbnail.
    let mut thumbnails: HashMap<String, String> = HashMap::new();

    for original in originals {
        let Some(thumb) = StoreLayout::thumbnail_for(&original, config.format.extension()) else {
            report.errors += 1;
            continue;
        };

        if !options.force && is_current(&original, &thumb) {
            log::debug!("Thumbnail is up to date: {}", thumb.display());
            report.skipped += 1;
        } else if options.dry_run {
            report.planned.push(original);
            continue;
        } else {
            match imaging::create_thumbnail(backend, &original, &thumb, config) {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    log::warn!("Failed to thumbnail {}: {}", original.display(), e);
                    report.errors += 1;
                    continue;
                }
            }
        }

        match (layout.site_url(&original), layout.site_url(&thumb)) {
            (Ok(image_url), Ok(thumb_url)) => {
                thumbnails.insert(image_url, thumb_url);
            }
            _ => report.errors += 1,
        }
    }

    if !options.dry_run {
        report.records_updated = sync_records(store, &thumbnails, &mut report.errors);
    }
    report
}

/// Point every image and variant at its regenerated thumbnail. Returns the
/// number of records saved.
fn sync_records(
    store: &ArtStore,
    thumbnails: &HashMap<String, String>,
    errors: &mut usize,
) -> usize {
    let mut updated = 0;
    for mut found in store.list_entries() {
        let mut changed = false;
        for image in &mut found.entry.images {
            changed |= sync_one(&image.image_url, &mut image.thumbnail_url, thumbnails);
            for variant in &mut image.variants {
                changed |= sync_one(&variant.image_url, &mut variant.thumbnail_url, thumbnails);
            }
        }
        if !changed {
            continue;
        }
        match store.save(&mut found) {
            Ok(()) => {
                log::info!("Updated thumbnails in {}", found.path.display());
                updated += 1;
            }
            Err(e) => {
                log::warn!("Failed to update {}: {}", found.path.display(), e);
                *errors += 1;
            }
        }
    }
    updated
}

fn sync_one(
    image_url: &str,
    thumbnail_url: &mut Option<String>,
    thumbnails: &HashMap<String, String>,
) -> bool {
    match thumbnails.get(image_url) {
        Some(new) if thumbnail_url.as_deref() != Some(new.as_str()) => {
            *thumbnail_url = Some(new.clone());
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CuratorConfig;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{sample_entry, write_asset};
    use crate::types::Category;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn setup() -> (TempDir, ArtStore) {
        let tmp = TempDir::new().unwrap();
        let store = ArtStore::new(StoreLayout::new(tmp.path(), &CuratorConfig::default()));
        (tmp, store)
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn finds_originals_but_not_thumbnails() {
        let (tmp, store) = setup();
        write_asset(tmp.path(), "/art/general/a.png");
        write_asset(tmp.path(), "/art/characters/chomb/b.jpg");
        write_asset(tmp.path(), "/art/general/thumbnails/a.webp");

        let found = find_originals(store.layout(), &MockBackend::new());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.jpg", "a.png"]);
    }

    #[test]
    fn skips_current_thumbnails_unless_forced() {
        let (tmp, store) = setup();
        let original = write_asset(tmp.path(), "/art/general/a.png");
        let thumb = write_asset(tmp.path(), "/art/general/thumbnails/a.webp");
        let now = SystemTime::now();
        set_mtime(&original, now - Duration::from_secs(60));
        set_mtime(&thumb, now);
        let config = ThumbnailConfig::default();

        let backend = MockBackend::new();
        let report = regenerate_thumbnails(&store, &backend, &config, RegenOptions::default());
        assert_eq!((report.found, report.skipped, report.processed), (1, 1, 0));
        assert!(backend.get_operations().is_empty());

        let forced = RegenOptions {
            force: true,
            ..RegenOptions::default()
        };
        let report = regenerate_thumbnails(&store, &backend, &config, forced);
        assert_eq!((report.skipped, report.processed), (0, 1));
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn stale_thumbnail_is_regenerated() {
        let (tmp, store) = setup();
        let original = write_asset(tmp.path(), "/art/general/a.png");
        let thumb = write_asset(tmp.path(), "/art/general/thumbnails/a.webp");
        let now = SystemTime::now();
        set_mtime(&thumb, now - Duration::from_secs(60));
        set_mtime(&original, now);

        let backend = MockBackend::new();
        let report = regenerate_thumbnails(
            &store,
            &backend,
            &ThumbnailConfig::default(),
            RegenOptions::default(),
        );
        assert_eq!(report.processed, 1);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (tmp, store) = setup();
        write_asset(tmp.path(), "/art/general/a.png");
        let backend = MockBackend::new();

        let report = regenerate_thumbnails(
            &store,
            &backend,
            &ThumbnailConfig::default(),
            RegenOptions {
                dry_run: true,
                force: false,
            },
        );

        assert_eq!(report.planned.len(), 1);
        assert_eq!(report.processed, 0);
        assert!(backend.get_operations().is_empty());
        assert!(!tmp.path().join("public/art/general/thumbnails").exists());
    }

    #[test]
    fn updates_stale_thumbnail_urls_in_records() {
        let (tmp, store) = setup();
        let mut entry = sample_entry("test-art", &["test-art"]);
        entry.images[0].thumbnail_url = Some("/art/general/thumb_old.webp".into());
        entry.images[0].variants[0].thumbnail_url = None;
        let path = store.layout().record_path(&Category::General, "test-art");
        store.create(&entry, &path).unwrap();
        write_asset(tmp.path(), "/art/general/test-art.png");
        write_asset(tmp.path(), "/art/general/test-art__blue.png");

        let report = regenerate_thumbnails(
            &store,
            &MockBackend::new(),
            &ThumbnailConfig::default(),
            RegenOptions::default(),
        );

        assert_eq!(report.processed, 2);
        assert_eq!(report.records_updated, 1);
        let reloaded = store.find_by_slug("test-art").unwrap().entry;
        assert_eq!(
            reloaded.images[0].thumbnail_url.as_deref(),
            Some("/art/general/thumbnails/test-art.webp")
        );
        assert_eq!(
            reloaded.images[0].variants[0].thumbnail_url.as_deref(),
            Some("/art/general/thumbnails/test-art__blue.webp")
        );
    }

    #[test]
    fn backend_failures_are_counted() {
        let (tmp, store) = setup();
        write_asset(tmp.path(), "/art/general/broken.png");
        write_asset(tmp.path(), "/art/general/fine.png");

        let report = regenerate_thumbnails(
            &store,
            &MockBackend::failing_on("broken"),
            &ThumbnailConfig::default(),
            RegenOptions::default(),
        );

        assert_eq!((report.found, report.processed, report.errors), (2, 1, 1));
    }
}
