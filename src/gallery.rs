//! Interactive gallery drafting.
//!
//! Turns an ordered list of source files into draft base images and variants,
//! one decision per source: start a new base image, or attach as a variant of
//! the most recent base. Nothing touches the asset tree here; drafts carry
//! their source paths and [`placement`](crate::placement) materializes them.
//!
//! ## Id allocation
//!
//! Ids are unique within an entry. The [`IdAllocator`] is seeded with the ids
//! already on the entry and claims every id it hands out:
//!
//! - a titled image gets `slug(title)`, suffixed `-2`, `-3`, … on collision;
//! - an untitled image gets the fallback slug (`test-art`, `test-art-2`, …)
//!   or, with no fallback, `image-N` starting after the batch built so far.
//!
//! Commands also reserve the file stems already present in the destination
//! asset directory, since entries in one category share that directory.

use crate::prompt::{PromptKey, Prompter};
use crate::slug::slugify;
use crate::types::ArtEntry;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

/// A base image waiting to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftImage {
    pub id: String,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub source: PathBuf,
    pub variants: Vec<DraftVariant>,
}

/// A variant waiting to be placed under its base.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftVariant {
    pub source: PathBuf,
    pub label: Option<String>,
    pub alt: Option<String>,
}

/// Result of a gallery build.
#[derive(Debug, Default, PartialEq)]
pub struct DraftGallery {
    /// New base images in input order.
    pub images: Vec<DraftImage>,
    /// Variants attached to the entry's existing last image (append only).
    pub existing_base_variants: Vec<DraftVariant>,
}

impl DraftGallery {
    /// Every source this draft will copy.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.existing_base_variants
            .iter()
            .map(|v| v.source.as_path())
            .chain(self.images.iter().flat_map(|img| {
                std::iter::once(img.source.as_path())
                    .chain(img.variants.iter().map(|v| v.source.as_path()))
            }))
    }
}

/// Hands out image ids that don't collide with each other or with a seed set.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: existing.into_iter().map(Into::into).collect(),
        }
    }

    /// Mark ids as used without handing them out.
    pub fn reserve<I, S>(&mut self, taken: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.used.extend(taken.into_iter().map(Into::into));
    }

    /// Claim `base`, or the first free `base-N` for N ≥ 2.
    pub fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 1;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.used.insert(candidate.clone());
        candidate
    }

    /// Claim a default id for an untitled image.
    ///
    /// `batch_len` is the number of base images drafted so far; numbered ids
    /// start just past it.
    pub fn claim_default(&mut self, fallback: Option<&str>, batch_len: usize) -> String {
        match fallback {
            Some(slug) if !slug.is_empty() => self.claim(slug),
            _ => {
                let mut n = batch_len + 1;
                let mut candidate = format!("image-{n}");
                while self.used.contains(&candidate) {
                    n += 1;
                    candidate = format!("image-{n}");
                }
                self.used.insert(candidate.clone());
                candidate
            }
        }
    }
}

/// Fail with the first source that isn't a readable file.
pub fn validate_sources(sources: &[PathBuf]) -> Result<(), GalleryError> {
    match sources.iter().find(|s| !s.is_file()) {
        Some(missing) => Err(GalleryError::SourceNotFound(missing.clone())),
        None => Ok(()),
    }
}

/// Drafts a gallery from source files through a [`Prompter`].
#[derive(Debug)]
pub struct GalleryBuilder {
    fallback_slug: Option<String>,
    ids: IdAllocator,
    existing_base: bool,
}

impl GalleryBuilder {
    /// Builder for a new entry. Untitled images fall back to `fallback_slug`.
    pub fn new(fallback_slug: Option<&str>) -> Self {
        Self {
            fallback_slug: fallback_slug.map(String::from),
            ids: IdAllocator::default(),
            existing_base: false,
        }
    }

    /// Builder for appending to `entry`: its ids are reserved, its slug is the
    /// fallback, and its last image is the initial variant target.
    pub fn for_entry(entry: &ArtEntry) -> Self {
        Self {
            fallback_slug: Some(entry.slug.clone()),
            ids: IdAllocator::new(entry.image_ids()),
            existing_base: !entry.images.is_empty(),
        }
    }

    /// Also treat `taken` as used, typically the file stems already in the
    /// destination asset directory, so a new base never lands on another
    /// entry's files.
    pub fn reserving<I, S>(mut self, taken: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.reserve(taken);
        self
    }

    /// Walk `sources` in order, asking the operator about each.
    ///
    /// All sources are checked before the first question, so a bad path
    /// aborts the batch without any input consumed.
    pub fn build<P: Prompter + ?Sized>(
        mut self,
        prompter: &mut P,
        sources: &[PathBuf],
    ) -> Result<DraftGallery, GalleryError> {
        validate_sources(sources)?;

        let mut draft = DraftGallery::default();
        for (i, source) in sources.iter().enumerate() {
            log::info!("Source {}/{}: {}", i + 1, sources.len(), source.display());

            let has_base = self.existing_base || !draft.images.is_empty();
            let as_variant = has_base
                && prompter.confirm(
                    PromptKey::AttachAsVariant,
                    "Make this a variant of the previous base image? (y/N):",
                )?;

            if as_variant {
                let label =
                    prompter.optional(PromptKey::VariantLabel, "Variant label (short, optional):")?;
                let alt =
                    prompter.optional(PromptKey::VariantAlt, "Variant alt text (recommended):")?;
                let variant = DraftVariant {
                    source: source.clone(),
                    label,
                    alt,
                };
                match draft.images.last_mut() {
                    Some(base) => base.variants.push(variant),
                    None => draft.existing_base_variants.push(variant),
                }
                log::debug!("Queued variant {}", source.display());
            } else {
                let title = prompter.optional(PromptKey::ImageTitle, "Image title (optional):")?;
                let alt = prompter.optional(PromptKey::ImageAlt, "Image alt text (recommended):")?;
                let id = self.allocate_id(title.as_deref(), draft.images.len());
                draft.images.push(DraftImage {
                    id,
                    title,
                    alt,
                    source: source.clone(),
                    variants: Vec::new(),
                });
            }
        }
        Ok(draft)
    }

    fn allocate_id(&mut self, title: Option<&str>, batch_len: usize) -> String {
        match title.map(slugify) {
            Some(slug) if !slug.is_empty() => self.ids.claim(&slug),
            _ => self
                .ids
                .claim_default(self.fallback_slug.as_deref(), batch_len),
        }
    }
}
