//! List filters.
//!
//! Mirrors the questions the site asks of the record tree: pinned work,
//! sketches vs. finished pieces, everything featuring a character, a tag, an
//! artist, or a free-text search over title and description. Text matching is
//! case-insensitive substring matching. Results come back newest first.

use crate::store::Found;
use crate::types::ArtEntry;

/// Sketch/finished split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Sketch,
    Finished,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtFilter {
    pub pinned_only: bool,
    pub finish: Option<Finish>,
    /// Matches the owning character or any related character.
    pub character: Option<String>,
    pub tag: Option<String>,
    /// Matches the `artist_name` key kept on records.
    pub artist: Option<String>,
    /// Matches title or description.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl ArtFilter {
    pub fn matches(&self, entry: &ArtEntry) -> bool {
        if self.pinned_only && !entry.pinned {
            return false;
        }
        match self.finish {
            Some(Finish::Sketch) if !entry.sketch => return false,
            Some(Finish::Finished) if entry.sketch => return false,
            _ => {}
        }
        if let Some(character) = &self.character {
            let owns = entry.character.as_deref() == Some(character.as_str());
            let related = entry.related_characters.iter().any(|c| c == character);
            if !owns && !related {
                return false;
            }
        }
        if let Some(tag) = &self.tag
            && !entry.tags.iter().any(|t| contains_ci(t, tag))
        {
            return false;
        }
        if let Some(artist) = &self.artist {
            let name = entry.extra.get("artist_name").and_then(|v| v.as_str());
            if name != Some(artist.as_str()) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let in_title = contains_ci(&entry.title, term);
            let in_desc = entry
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, term));
            if !in_title && !in_desc {
                return false;
            }
        }
        true
    }

    /// Keep matching records, newest `created_at` first, truncated to `limit`.
    pub fn apply(&self, records: Vec<Found>) -> Vec<Found> {
        let mut kept: Vec<Found> = records
            .into_iter()
            .filter(|f| self.matches(&f.entry))
            .collect();
        kept.sort_by(|a, b| b.entry.created_at.cmp(&a.entry.created_at));
        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_entry;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::PathBuf;

    fn found(entry: ArtEntry) -> Found {
        Found {
            path: PathBuf::from(format!("/records/{}.yml", entry.slug)),
            entry,
        }
    }

    fn slugs(records: &[Found]) -> Vec<&str> {
        records.iter().map(|f| f.entry.slug.as_str()).collect()
    }

    fn corpus() -> Vec<Found> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut old = sample_entry("old-sketch", &["a"]);
        old.created_at = base;
        old.sketch = true;
        old.tags = vec!["Ink".into()];

        let mut mid = sample_entry("mid-pinned", &["a"]);
        mid.created_at = base + Duration::days(10);
        mid.pinned = true;
        mid.character = Some("chomb".into());
        mid.description = Some("A quiet harbor at dusk".into());

        let mut new = sample_entry("new-guest", &["a"]);
        new.created_at = base + Duration::days(20);
        new.related_characters = vec!["chomb".into(), "pip".into()];
        new.extra.insert(
            "artist_name".into(),
            serde_yaml::Value::String("someone".into()),
        );

        vec![found(old), found(mid), found(new)]
    }

    #[test]
    fn default_filter_sorts_newest_first() {
        let out = ArtFilter::default().apply(corpus());
        assert_eq!(slugs(&out), vec!["new-guest", "mid-pinned", "old-sketch"]);
    }

    #[test]
    fn pinned_only() {
        let filter = ArtFilter {
            pinned_only: true,
            ..ArtFilter::default()
        };
        assert_eq!(slugs(&filter.apply(corpus())), vec!["mid-pinned"]);
    }

    #[test]
    fn sketch_and_finished_split() {
        let sketches = ArtFilter {
            finish: Some(Finish::Sketch),
            ..ArtFilter::default()
        };
        let finished = ArtFilter {
            finish: Some(Finish::Finished),
            ..ArtFilter::default()
        };
        assert_eq!(slugs(&sketches.apply(corpus())), vec!["old-sketch"]);
        assert_eq!(
            slugs(&finished.apply(corpus())),
            vec!["new-guest", "mid-pinned"]
        );
    }

    #[test]
    fn character_includes_related() {
        let filter = ArtFilter {
            character: Some("chomb".into()),
            ..ArtFilter::default()
        };
        assert_eq!(
            slugs(&filter.apply(corpus())),
            vec!["new-guest", "mid-pinned"]
        );
    }

    #[test]
    fn tag_search_and_artist() {
        let tag = ArtFilter {
            tag: Some("ink".into()),
            ..ArtFilter::default()
        };
        let search = ArtFilter {
            search: Some("HARBOR".into()),
            ..ArtFilter::default()
        };
        let artist = ArtFilter {
            artist: Some("someone".into()),
            ..ArtFilter::default()
        };
        assert_eq!(slugs(&tag.apply(corpus())), vec!["old-sketch"]);
        assert_eq!(slugs(&search.apply(corpus())), vec!["mid-pinned"]);
        assert_eq!(slugs(&artist.apply(corpus())), vec!["new-guest"]);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let filter = ArtFilter {
            limit: Some(1),
            ..ArtFilter::default()
        };
        assert_eq!(slugs(&filter.apply(corpus())), vec!["new-guest"]);
    }
}
