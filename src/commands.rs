//! Verb implementations.
//!
//! Every mutating verb follows the same shape: locate the record, change it
//! in memory, materialize any new files, then persist. Creation is
//! all-or-nothing: sources are validated and the target record path is
//! checked before any file is written, and placed files are removed again if
//! the record can't be written.

use crate::gallery::{self, DraftVariant, GalleryBuilder, GalleryError};
use crate::imaging::{ImageBackend, ThumbnailConfig};
use crate::placement::{self, PlacementError};
use crate::prompt::{PromptKey, Prompter, is_yes, split_list};
use crate::query::ArtFilter;
use crate::regen::{self, RegenOptions, RegenReport};
use crate::slug::{is_slug, slugify};
use crate::store::{ArtStore, DeletionReport, Found, StoreError};
use crate::types::{ArtEntry, ArtImageVariant, Category};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Placement(PlacementError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(slug) => {
                CommandError::NotFound(format!("No art entry with slug '{slug}'"))
            }
            StoreError::AlreadyExists(path) => {
                CommandError::Conflict(format!("Record already exists: {}", path.display()))
            }
            other => CommandError::Store(other),
        }
    }
}

impl From<PlacementError> for CommandError {
    fn from(e: PlacementError) -> Self {
        match e {
            PlacementError::Occupied(path) => CommandError::Conflict(format!(
                "Asset file already exists: {}",
                path.display()
            )),
            other => CommandError::Placement(other),
        }
    }
}

impl From<GalleryError> for CommandError {
    fn from(e: GalleryError) -> Self {
        match e {
            GalleryError::SourceNotFound(path) => {
                CommandError::NotFound(format!("Image file not found: {}", path.display()))
            }
            GalleryError::Prompt(io) => CommandError::Io(io),
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Outcome of `delete`.
#[derive(Debug, PartialEq)]
pub enum DeleteOutcome {
    Deleted(DeletionReport),
    Declined,
}

/// The curator: a record store, an image backend, and an operator.
pub struct Curator<B: ImageBackend, P: Prompter> {
    store: ArtStore,
    backend: B,
    prompter: P,
    thumbnails: ThumbnailConfig,
}

impl<B: ImageBackend, P: Prompter> Curator<B, P> {
    pub fn new(store: ArtStore, backend: B, prompter: P, thumbnails: ThumbnailConfig) -> Self {
        Self {
            store,
            backend,
            prompter,
            thumbnails,
        }
    }

    pub fn store(&self) -> &ArtStore {
        &self.store
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // =====================================================================
    // create / append / add-variants
    // =====================================================================

    /// Create a new entry from `sources`, asking for its metadata.
    pub fn create(&mut self, sources: &[PathBuf]) -> Result<Found> {
        if sources.is_empty() {
            return Err(CommandError::Validation(
                "Provide at least one image path.".into(),
            ));
        }
        gallery::validate_sources(sources)?;
        log::info!("Creating new art with {} file(s)", sources.len());

        let p = &mut self.prompter;
        let title = p.ask(PromptKey::Title, "Artwork title:")?;
        if title.is_empty() {
            return Err(CommandError::Validation("Title required.".into()));
        }
        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(CommandError::Validation(format!(
                "Title '{title}' has no letters or digits to build a slug from."
            )));
        }
        let pinned = p.confirm(PromptKey::Pinned, "Pinned? (y/N):")?;
        let sketch = p.confirm(PromptKey::Sketch, "Sketch? (y/N):")?;
        let description = p.optional(PromptKey::Description, "Description (optional):")?;
        let tags = split_list(&p.ask(PromptKey::Tags, "Tags (comma, optional):")?);

        let category_answer = p.ask(PromptKey::Category, "Character art or general? (c/g):")?;
        let (character, related_characters) =
            if category_answer.to_lowercase().starts_with('c') {
                let character = p.ask(PromptKey::Character, "Primary character slug:")?;
                if character.is_empty() {
                    return Err(CommandError::Validation("Character slug required.".into()));
                }
                if !is_slug(&character) {
                    return Err(CommandError::Validation(format!(
                        "'{character}' is not a character slug (try '{}').",
                        slugify(&character)
                    )));
                }
                let related = split_list(&p.ask(
                    PromptKey::RelatedCharacters,
                    "Related characters (comma, optional):",
                )?);
                (Some(character), related)
            } else {
                (None, Vec::new())
            };
        let category = match &character {
            Some(c) => Category::Character(c.clone()),
            None => Category::General,
        };

        let record_path = self.store.layout().record_path(&category, &slug);
        if record_path.exists() {
            return Err(CommandError::Conflict(format!(
                "Record already exists: {}",
                record_path.display()
            )));
        }

        let taken = self.store.layout().asset_dir(&category).taken_stems();
        let draft = GalleryBuilder::new(Some(&slug))
            .reserving(taken)
            .build(&mut self.prompter, sources)?;

        let default_created = earliest_mtime(sources);
        let answer = self.prompter.ask(
            PromptKey::CreationDate,
            &format!(
                "Creation date (YYYY-MM-DD or ISO, blank = file date {}):",
                default_created.format("%Y-%m-%d")
            ),
        )?;
        let created_at = resolve_created_at(&answer, default_created);

        let placed = placement::place_gallery(
            self.store.layout(),
            &self.backend,
            &self.thumbnails,
            &category,
            &draft,
            None,
        )?;

        let entry = ArtEntry {
            slug: slug.clone(),
            created_at,
            modified_at: Utc::now(),
            title,
            description,
            tags,
            character,
            related_characters,
            pinned,
            sketch,
            images: placed.images,
            extra: BTreeMap::new(),
        };
        if let Err(e) = self.store.create(&entry, &record_path) {
            self.store.remove_assets(&entry.asset_urls());
            return Err(e.into());
        }
        log::info!("Created art: {slug}");
        Ok(Found {
            path: record_path,
            entry,
        })
    }

    /// Add images (and variants of the last image) to an existing entry.
    pub fn append(&mut self, slug: &str, sources: &[PathBuf]) -> Result<Found> {
        if sources.is_empty() {
            return Err(CommandError::Validation(
                "Provide at least one image path.".into(),
            ));
        }
        let mut found = self.store.find_by_slug(slug)?;
        self.store.ensure_image_ids(&mut found)?;

        let category = found.entry.category();
        let taken = self.store.layout().asset_dir(&category).taken_stems();
        let draft = GalleryBuilder::for_entry(&found.entry)
            .reserving(taken)
            .build(&mut self.prompter, sources)?;
        let placed = placement::place_gallery(
            self.store.layout(),
            &self.backend,
            &self.thumbnails,
            &category,
            &draft,
            found.entry.images.last(),
        )?;

        let mut new_urls: Vec<String> = placed
            .existing_base_variants
            .iter()
            .flat_map(ArtImageVariant::asset_urls)
            .collect();
        new_urls.extend(placed.images.iter().flat_map(|i| i.asset_urls()));

        if let Some(last) = found.entry.images.last_mut() {
            last.variants.extend(placed.existing_base_variants);
        }
        found.entry.images.extend(placed.images);
        self.save_or_discard(&mut found, &new_urls)?;
        log::info!("Appended images to {slug}");
        Ok(found)
    }

    /// Attach variant files to a chosen base image.
    ///
    /// `image_id` picks the base by id or by a fragment of its `image_url`.
    /// If it names an existing file it is treated as the first variant
    /// instead. Without a usable id the operator picks the base by index.
    pub fn add_variants(
        &mut self,
        slug: &str,
        image_id: Option<&str>,
        files: &[PathBuf],
    ) -> Result<Found> {
        let mut found = self.store.find_by_slug(slug)?;
        self.store.ensure_image_ids(&mut found)?;

        let mut files = files.to_vec();
        let mut image_id = image_id;
        if let Some(id) = image_id
            && Path::new(id).is_file()
        {
            files.insert(0, PathBuf::from(id));
            image_id = None;
        }
        if files.is_empty() {
            return Err(CommandError::Validation(
                "No variant image files provided.".into(),
            ));
        }
        gallery::validate_sources(&files)?;
        if found.entry.images.is_empty() {
            return Err(CommandError::Validation(format!(
                "'{slug}' has no images to attach variants to."
            )));
        }

        let by_id = image_id.and_then(|id| {
            let idx = found
                .entry
                .images
                .iter()
                .position(|i| i.id == id || i.image_url.contains(id));
            if idx.is_none() {
                log::warn!("Image id not found; entering interactive selection.");
            }
            idx
        });
        let idx = match by_id {
            Some(idx) => idx,
            None => self.select_base(&found.entry)?,
        };

        let mut drafts = Vec::with_capacity(files.len());
        for file in &files {
            let label = self.prompter.optional(
                PromptKey::VariantLabel,
                &format!("Variant label ({}) (optional):", file.display()),
            )?;
            let alt = self
                .prompter
                .optional(PromptKey::VariantAlt, "Variant alt (recommended):")?;
            drafts.push(DraftVariant {
                source: file.clone(),
                label,
                alt,
            });
        }

        let base = &found.entry.images[idx];
        let placed = placement::place_variants(
            self.store.layout(),
            &self.backend,
            &self.thumbnails,
            &found.entry.category(),
            base,
            &drafts,
        )?;
        let new_urls: Vec<String> = placed.iter().flat_map(ArtImageVariant::asset_urls).collect();
        let base_id = base.id.clone();
        found.entry.images[idx].variants.extend(placed);
        self.save_or_discard(&mut found, &new_urls)?;
        log::info!("Variants added to base image id: {base_id}");
        Ok(found)
    }

    fn select_base(&mut self, entry: &ArtEntry) -> Result<usize> {
        self.prompter
            .inform("Select base image to attach variants:")?;
        for (idx, img) in entry.images.iter().enumerate() {
            self.prompter
                .inform(&format!("  [{idx}] id={} url={}", img.id, img.image_url))?;
        }
        let answer = self
            .prompter
            .ask(PromptKey::BaseIndex, "Index (default 0):")?;
        let choice = if answer.is_empty() {
            Some(0)
        } else {
            answer.parse::<usize>().ok()
        };
        match choice {
            Some(idx) if idx < entry.images.len() => Ok(idx),
            _ => Err(CommandError::Validation("Invalid selection.".into())),
        }
    }

    fn save_or_discard(&self, found: &mut Found, new_urls: &[String]) -> Result<()> {
        if let Err(e) = self.store.save(found) {
            self.store.remove_assets(new_urls);
            return Err(e.into());
        }
        Ok(())
    }

    // =====================================================================
    // remove-image / remove-variant
    // =====================================================================

    /// Drop an image (and its variants) from an entry. `files` also removes
    /// the referenced assets, best-effort.
    pub fn remove_image(
        &mut self,
        slug: &str,
        image_id: &str,
        files: bool,
    ) -> Result<(Found, DeletionReport)> {
        let mut found = self.store.find_by_slug(slug)?;
        let idx = found
            .entry
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or_else(|| CommandError::NotFound(format!("Image '{image_id}' not found")))?;

        let removed = found.entry.images.remove(idx);
        self.store.save(&mut found)?;
        let report = if files {
            self.store.remove_assets(&removed.asset_urls())
        } else {
            DeletionReport::default()
        };
        log::info!("Removed image {image_id}");
        Ok((found, report))
    }

    /// Drop one variant, chosen by label or, failing that, by index.
    pub fn remove_variant(
        &mut self,
        slug: &str,
        image_id: &str,
        label_or_index: &str,
        files: bool,
    ) -> Result<(Found, DeletionReport)> {
        let mut found = self.store.find_by_slug(slug)?;
        let base = found
            .entry
            .image_mut(image_id)
            .ok_or_else(|| CommandError::NotFound(format!("Image '{image_id}' not found")))?;
        if base.variants.is_empty() {
            return Err(CommandError::NotFound(format!(
                "Image '{image_id}' has no variants"
            )));
        }
        let idx = select_variant(&base.variants, label_or_index).ok_or_else(|| {
            CommandError::NotFound(format!("Variant '{label_or_index}' not found"))
        })?;

        let removed = base.variants.remove(idx);
        self.store.save(&mut found)?;
        let report = if files {
            self.store.remove_assets(&removed.asset_urls())
        } else {
            DeletionReport::default()
        };
        log::info!("Removed variant {label_or_index} from image {image_id}");
        Ok((found, report))
    }

    // =====================================================================
    // update-meta / show / list / delete / regen
    // =====================================================================

    /// Edit title, description, tags, and flags. Blank answers keep the
    /// current value, except tags where blank clears them.
    pub fn update_meta(&mut self, slug: &str) -> Result<Found> {
        let mut found = self.store.find_by_slug(slug)?;
        let entry = &mut found.entry;
        let p = &mut self.prompter;

        let title = p.ask(PromptKey::Title, &format!("Title [{}]:", entry.title))?;
        let description = p.ask(PromptKey::Description, "Description (leave blank keep):")?;
        let tags = p.ask_raw(
            PromptKey::Tags,
            &format!("Tags (comma) [{}]:", entry.tags.join(",")),
        )?;
        let pinned = p.ask(
            PromptKey::Pinned,
            &format!("Pinned? (y/N) [{}]:", yn(entry.pinned)),
        )?;
        let sketch = p.ask(
            PromptKey::Sketch,
            &format!("Sketch? (y/N) [{}]:", yn(entry.sketch)),
        )?;

        if !title.is_empty() {
            entry.title = title;
        }
        if !description.is_empty() {
            entry.description = Some(description);
        }
        // Only a truly empty answer clears tags; whitespace keeps them.
        if !tags.trim().is_empty() {
            entry.tags = split_list(&tags);
        } else if tags.is_empty() {
            entry.tags.clear();
        }
        apply_flag(&mut entry.pinned, &pinned);
        apply_flag(&mut entry.sketch, &sketch);

        self.store.save(&mut found)?;
        log::info!("Updated metadata for {slug}");
        Ok(found)
    }

    pub fn show(&self, slug: &str) -> Result<Found> {
        Ok(self.store.find_by_slug(slug)?)
    }

    pub fn list(&self, filter: &ArtFilter) -> Vec<Found> {
        filter.apply(self.store.list_entries())
    }

    /// Delete an entry, asking first unless `assume_yes`.
    pub fn delete(&mut self, slug: &str, files: bool, assume_yes: bool) -> Result<DeleteOutcome> {
        let found = self.store.find_by_slug(slug)?;
        if !assume_yes {
            let question = format!(
                "Delete '{}' ({} images){}? (y/N):",
                slug,
                found.entry.images.len(),
                if files { " and its files" } else { "" }
            );
            if !self.prompter.confirm(PromptKey::ConfirmDelete, &question)? {
                log::info!("Left {slug} in place");
                return Ok(DeleteOutcome::Declined);
            }
        }
        Ok(DeleteOutcome::Deleted(self.store.delete(&found, files)?))
    }

    pub fn regen_thumbnails(&self, options: RegenOptions) -> RegenReport {
        regen::regenerate_thumbnails(&self.store, &self.backend, &self.thumbnails, options)
    }
}

fn yn(flag: bool) -> &'static str {
    if flag { "y" } else { "n" }
}

/// `y…` sets, any other non-blank answer clears, blank keeps.
fn apply_flag(flag: &mut bool, answer: &str) {
    if is_yes(answer) {
        *flag = true;
    } else if !answer.is_empty() {
        *flag = false;
    }
}

/// Label match wins; an all-digit token that matches no label is an index.
pub fn select_variant(variants: &[ArtImageVariant], token: &str) -> Option<usize> {
    if let Some(idx) = variants
        .iter()
        .position(|v| v.label.as_deref() == Some(token))
    {
        return Some(idx);
    }
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse::<usize>().ok().filter(|&i| i < variants.len())
}

/// Earliest modification time among `sources`, or now if none can be read.
fn earliest_mtime(sources: &[PathBuf]) -> DateTime<Utc> {
    sources
        .iter()
        .filter_map(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok())
        .min()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(Utc::now)
}

/// Interpret the creation-date answer.
///
/// Blank keeps `default`; `now` is the current time; `YYYY-MM-DD` is midnight
/// UTC; RFC 3339 and naive `YYYY-MM-DD[T ]HH:MM:SS` (read as UTC) are also
/// accepted. Anything else logs a warning and keeps `default`.
pub fn resolve_created_at(answer: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    let answer = answer.trim();
    if answer.is_empty() {
        return default;
    }
    if answer.eq_ignore_ascii_case("now") {
        return Utc::now();
    }
    if let Ok(date) = NaiveDate::parse_from_str(answer, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return midnight.and_utc();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(answer) {
        return dt.with_timezone(&Utc);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(answer, fmt) {
            return naive.and_utc();
        }
    }
    log::warn!("Could not parse creation date '{answer}', falling back to earliest file mtime.");
    default
}
