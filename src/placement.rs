//! Materializing drafts into the asset tree.
//!
//! Each drafted source is copied next to its siblings and thumbnailed:
//!
//! ```text
//! <asset dir>/<id>.<ext>                        base image
//! <asset dir>/<id>__<variant>.<ext>             variant
//! <asset dir>/thumbnails/<id>[__<variant>].webp thumbnails
//! ```
//!
//! `<variant>` is the slugged label, or `variant-N` (N = 1-based position
//! under its base) when the label is absent or slugs to nothing. A variant
//! name already taken on disk gets a `-2`, `-3`, … suffix.
//!
//! Placement never overwrites. A base image whose original or thumbnail is
//! already on disk fails with [`PlacementError::Occupied`] before anything is
//! copied; callers avoid this by reserving on-disk stems when allocating ids.
//!
//! A [`Placer`] remembers every file it created. If any item fails, the
//! files created so far are removed again so a failed command leaves the
//! asset tree as it found it.

use crate::gallery::{DraftGallery, DraftImage, DraftVariant};
use crate::imaging::{self, BackendError, ImageBackend, ThumbnailConfig};
use crate::layout::{AssetDir, LayoutError, StoreLayout};
use crate::slug::slugify_or;
use crate::types::{ArtImage, ArtImageVariant, Category};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacementError {
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Refusing to overwrite existing file: {0}")]
    Occupied(PathBuf),
}

/// Placed output of a [`DraftGallery`].
#[derive(Debug, Default, PartialEq)]
pub struct PlacedGallery {
    pub images: Vec<ArtImage>,
    /// Variants to append to the entry's existing last image.
    pub existing_base_variants: Vec<ArtImageVariant>,
}

pub struct Placer<'a, B: ImageBackend> {
    layout: &'a StoreLayout,
    backend: &'a B,
    thumbnails: &'a ThumbnailConfig,
    dir: AssetDir,
    created: Vec<PathBuf>,
}

impl<'a, B: ImageBackend> Placer<'a, B> {
    pub fn new(
        layout: &'a StoreLayout,
        backend: &'a B,
        thumbnails: &'a ThumbnailConfig,
        category: &Category,
    ) -> Self {
        Self {
            dir: layout.asset_dir(category),
            layout,
            backend,
            thumbnails,
            created: Vec::new(),
        }
    }

    /// Files created so far, in creation order.
    pub fn created(&self) -> &[PathBuf] {
        &self.created
    }

    /// Place a drafted base image and its drafted variants.
    pub fn place_image(&mut self, draft: &DraftImage) -> Result<ArtImage, PlacementError> {
        let (image_url, thumbnail_url) = self.materialize(&draft.source, &draft.id)?;
        let mut image = ArtImage {
            id: draft.id.clone(),
            title: draft.title.clone(),
            alt: draft.alt.clone(),
            image_url,
            thumbnail_url: Some(thumbnail_url),
            variants: Vec::new(),
        };
        for variant in &draft.variants {
            let placed = self.place_variant(&image.id, image.variants.len(), variant)?;
            image.variants.push(placed);
        }
        Ok(image)
    }

    /// Place one variant of base `base_id`, which already has `existing` variants.
    pub fn place_variant(
        &mut self,
        base_id: &str,
        existing: usize,
        draft: &DraftVariant,
    ) -> Result<ArtImageVariant, PlacementError> {
        let fallback = format!("variant-{}", existing + 1);
        let part = slugify_or(draft.label.as_deref(), &fallback);
        let stem = self.free_variant_stem(base_id, &part, &draft.source);
        let (image_url, thumbnail_url) = self.materialize(&draft.source, &stem)?;
        log::info!("Added variant {stem}");
        Ok(ArtImageVariant {
            image_url,
            thumbnail_url: Some(thumbnail_url),
            label: draft.label.clone(),
            alt: draft.alt.clone(),
        })
    }

    /// Keep the created files.
    pub fn commit(self) -> Vec<PathBuf> {
        self.created
    }

    /// Remove every file this placer created. Best-effort.
    pub fn rollback(self) {
        for path in self.created.iter().rev() {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("Rolled back {}", path.display()),
                Err(e) => log::warn!("Could not roll back {}: {}", path.display(), e),
            }
        }
    }

    /// Copy `source` to `<dir>/<stem>.<ext>` and thumbnail it.
    fn materialize(&mut self, source: &Path, stem: &str) -> Result<(String, String), PlacementError> {
        let dest = self.dir.originals.join(file_name(stem, source));
        let thumb = self
            .dir
            .thumbnails
            .join(format!("{stem}.{}", self.thumbnails.format.extension()));

        if let Some(occupied) = [&dest, &thumb].into_iter().find(|p| p.exists()) {
            return Err(PlacementError::Occupied(occupied.clone()));
        }

        let (backend, config) = (self.backend, self.thumbnails);
        self.track(&dest, |d| imaging::copy_image(source, d).map(|_| ()))?;
        self.track(&thumb, |t| imaging::create_thumbnail(backend, &dest, t, config))?;

        Ok((self.layout.site_url(&dest)?, self.layout.site_url(&thumb)?))
    }

    fn track(
        &mut self,
        path: &Path,
        write: impl FnOnce(&Path) -> Result<(), BackendError>,
    ) -> Result<(), BackendError> {
        write(path)?;
        self.created.push(path.to_path_buf());
        Ok(())
    }

    fn free_variant_stem(&self, base_id: &str, part: &str, source: &Path) -> String {
        let taken = |stem: &str| {
            self.dir.originals.join(file_name(stem, source)).exists()
                || self
                    .dir
                    .thumbnails
                    .join(format!("{stem}.{}", self.thumbnails.format.extension()))
                    .exists()
        };
        let mut stem = format!("{base_id}__{part}");
        let mut n = 1;
        while taken(&stem) {
            n += 1;
            stem = format!("{base_id}__{part}-{n}");
        }
        stem
    }
}

/// `<stem>` plus the source's extension, kept as written.
fn file_name(stem: &str, source: &Path) -> String {
    match source.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_string(),
    }
}

/// Place a whole draft. On failure every file created is removed.
///
/// `existing_base` is the entry's last image when appending; drafted
/// variants for it are named after its id and current variant count.
pub fn place_gallery<B: ImageBackend>(
    layout: &StoreLayout,
    backend: &B,
    thumbnails: &ThumbnailConfig,
    category: &Category,
    draft: &DraftGallery,
    existing_base: Option<&ArtImage>,
) -> Result<PlacedGallery, PlacementError> {
    log::info!("Placing {} source file(s)", draft.sources().count());
    let mut placer = Placer::new(layout, backend, thumbnails, category);
    match place_into(&mut placer, draft, existing_base) {
        Ok(placed) => {
            placer.commit();
            Ok(placed)
        }
        Err(e) => {
            placer.rollback();
            Err(e)
        }
    }
}

fn place_into<B: ImageBackend>(
    placer: &mut Placer<'_, B>,
    draft: &DraftGallery,
    existing_base: Option<&ArtImage>,
) -> Result<PlacedGallery, PlacementError> {
    let mut placed = PlacedGallery::default();
    if let Some(base) = existing_base {
        for variant in &draft.existing_base_variants {
            let existing = base.variants.len() + placed.existing_base_variants.len();
            let v = placer.place_variant(&base.id, existing, variant)?;
            placed.existing_base_variants.push(v);
        }
    }
    for image in &draft.images {
        placed.images.push(placer.place_image(image)?);
    }
    Ok(placed)
}

/// Place variants under an explicitly chosen base. On failure every file
/// created is removed.
pub fn place_variants<B: ImageBackend>(
    layout: &StoreLayout,
    backend: &B,
    thumbnails: &ThumbnailConfig,
    category: &Category,
    base: &ArtImage,
    drafts: &[DraftVariant],
) -> Result<Vec<ArtImageVariant>, PlacementError> {
    let mut placer = Placer::new(layout, backend, thumbnails, category);
    let mut placed = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match placer.place_variant(&base.id, base.variants.len() + placed.len(), draft) {
            Ok(v) => placed.push(v),
            Err(e) => {
                placer.rollback();
                return Err(e);
            }
        }
    }
    placer.commit();
    Ok(placed)
}
