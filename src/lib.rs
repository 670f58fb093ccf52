//! # Art Curator
//!
//! Ingests artwork into a YAML-backed catalog that a static site reads
//! directly. Each artwork is one record; its images are copied into the
//! public asset tree alongside square thumbnails, and the record keeps
//! site-relative URLs to both.
//!
//! # Data Model
//!
//! ```text
//! ArtEntry (one .yml)
//! └── images: ArtImage        base image, unique id within the entry
//!     └── variants: ArtImageVariant   alternate rendition, optional label
//! ```
//!
//! Records live under `content/art/{characters/<c>/,general/}` and assets
//! under the mirrored `public/art/...` tree, with thumbnails in a
//! `thumbnails/` subdirectory. See [`layout`].
//!
//! # Flow of a Mutating Command
//!
//! ```text
//! locate record → prompt → draft gallery → place files → persist record
//!     (store)    (prompt)    (gallery)     (placement)     (store)
//! ```
//!
//! Drafting is pure: the operator's answers become a typed
//! [`gallery::DraftGallery`] before anything touches disk. Placement then
//! copies originals and renders thumbnails, and removes what it wrote if a
//! later file fails. Creation refuses to overwrite an existing record.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`commands`] | One method per CLI verb on [`commands::Curator`] |
//! | [`config`] | `art-curator.toml` loading, merging over stock defaults, validation |
//! | [`gallery`] | Turns source paths plus answers into a draft gallery with unique ids |
//! | [`imaging`] | Image backend trait, pure-Rust backend, copy and thumbnail operations |
//! | [`layout`] | Record paths, asset directories, URL ↔ disk path mapping |
//! | [`output`] | CLI output formatting |
//! | [`placement`] | Materializes drafts into files and URLs, with rollback |
//! | [`prompt`] | Operator input abstraction: console and scripted prompters |
//! | [`query`] | List filters (pinned, sketch, character, tag, artist, search) |
//! | [`regen`] | Bulk thumbnail regeneration |
//! | [`slug`] | Slug derivation for titles, labels and ids |
//! | [`store`] | Record discovery, load/save, id backfill, cascading deletion |
//! | [`types`] | The record schema |

pub mod commands;
pub mod config;
pub mod gallery;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod placement;
pub mod prompt;
pub mod query;
pub mod regen;
pub mod slug;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
