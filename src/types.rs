//! Art record types persisted as YAML.
//!
//! One [`ArtEntry`] per file. The site's content layer reads these records
//! directly, so field names and omission rules here are the on-disk schema:
//!
//! ```yaml
//! slug: test-art
//! created_at: 2024-05-01T12:00:00.000Z
//! modified_at: 2024-05-02T08:30:00.000Z
//! title: Test Art
//! pinned: false
//! sketch: false
//! images:
//!   - id: test-art
//!     image_url: /art/general/test-art.png
//!     thumbnail_url: /art/general/thumbnails/test-art.webp
//!     variants:
//!       - image_url: /art/general/test-art__blue.png
//!         thumbnail_url: /art/general/thumbnails/test-art__blue.webp
//!         label: blue
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One artwork's metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtEntry {
    pub slug: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub modified_at: DateTime<Utc>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_characters: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub sketch: bool,
    #[serde(default)]
    pub images: Vec<ArtImage>,
    /// Keys this tool doesn't manage (e.g. `artist_name`), kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ArtEntry {
    /// Where this entry's records and assets live.
    pub fn category(&self) -> Category {
        match &self.character {
            Some(c) if !c.is_empty() => Category::Character(c.clone()),
            _ => Category::General,
        }
    }

    pub fn image(&self, id: &str) -> Option<&ArtImage> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn image_mut(&mut self, id: &str) -> Option<&mut ArtImage> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    /// Ids currently in use, for seeding id allocation.
    pub fn image_ids(&self) -> impl Iterator<Item = &str> {
        self.images
            .iter()
            .map(|i| i.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Every site URL this entry references: originals, thumbnails, and variants.
    pub fn asset_urls(&self) -> Vec<String> {
        self.images.iter().flat_map(ArtImage::asset_urls).collect()
    }
}

/// A base image within an entry's gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtImage {
    /// Empty in legacy records until backfilled.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ArtImageVariant>,
}

impl ArtImage {
    /// URLs of this image, its thumbnail, and all variant files.
    pub fn asset_urls(&self) -> Vec<String> {
        let mut urls = vec![self.image_url.clone()];
        urls.extend(self.thumbnail_url.clone());
        for variant in &self.variants {
            urls.extend(variant.asset_urls());
        }
        urls
    }
}

/// An alternate rendition of a base image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtImageVariant {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ArtImageVariant {
    pub fn asset_urls(&self) -> Vec<String> {
        let mut urls = vec![self.image_url.clone()];
        urls.extend(self.thumbnail_url.clone());
        urls
    }
}

/// Record/asset partition: `characters/<slug>` or `general`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Character(String),
    General,
}

/// Summary row returned by listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtSummary {
    pub slug: String,
    pub title: String,
    pub image_count: usize,
    pub path: String,
}

/// Timestamps as `2024-05-01T12:00:00.000Z`, matching what the site expects.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
