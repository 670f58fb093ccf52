//! CLI output formatting.
//!
//! Output is entry-centric: every record leads with its slug, image count and
//! title, and file locations follow as indented context lines.
//!
//! ```text
//! Found 2 art entries
//! big-wave (2 images) - Big Wave
//!     Source: characters/chomb/big-wave.yml
//!     Flags: pinned
//! test-art (1 image) - Test Art
//!     Source: general/test-art.yml
//! ```
//!
//! After a mutating command the affected entry is shown with its gallery:
//!
//! ```text
//! test-art (2 images) - Test Art
//!     001 test-art → /art/general/test-art.png
//!         variant night → /art/general/test-art__night.png
//!     002 test-art-2 → /art/general/test-art-2.png
//! ```
//!
//! Each view has a `format_*` function (returns lines, no I/O) and a
//! `print_*` wrapper that writes to stdout.

use crate::commands::CommandError;
use crate::regen::RegenReport;
use crate::store::{DeletionOutcome, DeletionReport, Found};
use crate::types::{ArtEntry, ArtSummary};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// `slug (N images) - Title`
fn entry_header(entry: &ArtEntry) -> String {
    format!(
        "{} ({}) - {}",
        entry.slug,
        plural(entry.images.len(), "image", "images"),
        entry.title
    )
}

/// Path of a record relative to the record root, falling back to the full path.
fn relative_source(path: &Path, content_dir: &Path) -> String {
    path.strip_prefix(content_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn flags(entry: &ArtEntry) -> Option<String> {
    let mut out = Vec::new();
    if entry.pinned {
        out.push("pinned");
    }
    if entry.sketch {
        out.push("sketch");
    }
    (!out.is_empty()).then(|| out.join(", "))
}

// ============================================================================
// list / show
// ============================================================================

pub fn format_list(records: &[Found], content_dir: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Found {}",
        plural(records.len(), "art entry", "art entries")
    )];
    for found in records {
        lines.push(entry_header(&found.entry));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            relative_source(&found.path, content_dir)
        ));
        if let Some(f) = flags(&found.entry) {
            lines.push(format!("{}Flags: {}", indent(1), f));
        }
    }
    lines
}

pub fn print_list(records: &[Found], content_dir: &Path) {
    for line in format_list(records, content_dir) {
        println!("{}", line);
    }
}

/// Summary rows as pretty JSON.
pub fn format_list_json(records: &[Found]) -> serde_json::Result<String> {
    let rows: Vec<ArtSummary> = records.iter().map(Found::summary).collect();
    serde_json::to_string_pretty(&rows)
}

/// The whole record, as YAML or pretty JSON.
pub fn format_record(entry: &ArtEntry, json: bool) -> Result<String, CommandError> {
    if json {
        Ok(serde_json::to_string_pretty(entry)?)
    } else {
        Ok(serde_yaml::to_string(entry)?)
    }
}

/// An entry and its gallery tree.
pub fn format_entry(entry: &ArtEntry) -> Vec<String> {
    let mut lines = vec![entry_header(entry)];
    for (i, image) in entry.images.iter().enumerate() {
        let name = if image.id.is_empty() {
            "(no id)"
        } else {
            image.id.as_str()
        };
        lines.push(format!(
            "{}{} {} → {}",
            indent(1),
            format_index(i + 1),
            name,
            image.image_url
        ));
        for variant in &image.variants {
            lines.push(format!(
                "{}variant {} → {}",
                indent(2),
                variant.label.as_deref().unwrap_or("(unlabelled)"),
                variant.image_url
            ));
        }
    }
    lines
}

pub fn print_entry(entry: &ArtEntry) {
    for line in format_entry(entry) {
        println!("{}", line);
    }
}

// ============================================================================
// Deletion and regeneration reports
// ============================================================================

pub fn format_deletion_report(report: &DeletionReport) -> Vec<String> {
    if report.tasks.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<String> = report
        .tasks
        .iter()
        .map(|(url, outcome)| match outcome {
            DeletionOutcome::Removed => format!("{}removed {}", indent(1), url),
            DeletionOutcome::Missing => format!("{}missing {}", indent(1), url),
            DeletionOutcome::Failed(reason) => {
                format!("{}failed  {} ({})", indent(1), url, reason)
            }
        })
        .collect();
    lines.push(format!(
        "Removed {}, {} missing, {} failed",
        plural(report.removed(), "file", "files"),
        report.missing(),
        report.failed()
    ));
    lines
}

pub fn print_deletion_report(report: &DeletionReport) {
    for line in format_deletion_report(report) {
        println!("{}", line);
    }
}

pub fn format_regen_report(report: &RegenReport, dry_run: bool) -> Vec<String> {
    if dry_run {
        let mut lines = vec![format!(
            "Would regenerate {} of {}",
            report.planned.len(),
            plural(report.found, "original", "originals")
        )];
        lines.extend(
            report
                .planned
                .iter()
                .map(|p| format!("{}{}", indent(1), p.display())),
        );
        return lines;
    }
    vec![
        format!(
            "Regenerated {} of {}",
            report.processed,
            plural(report.found, "original", "originals")
        ),
        format!("{}Up to date: {}", indent(1), report.skipped),
        format!("{}Errors: {}", indent(1), report.errors),
        format!("{}Records updated: {}", indent(1), report.records_updated),
    ]
}

pub fn print_regen_report(report: &RegenReport, dry_run: bool) {
    for line in format_regen_report(report, dry_run) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_entry;
    use std::path::PathBuf;

    fn found(slug: &str, ids: &[&str], rel: &str) -> Found {
        Found {
            path: PathBuf::from("/site/content/art").join(rel),
            entry: sample_entry(slug, ids),
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn list_rows_with_sources_and_flags() {
        let mut pinned = found("big-wave", &["a", "b"], "characters/chomb/big-wave.yml");
        pinned.entry.pinned = true;
        pinned.entry.sketch = true;
        let plain = found("test-art", &["a"], "general/test-art.yml");

        let lines = format_list(&[pinned, plain], Path::new("/site/content/art"));

        assert_eq!(
            lines,
            vec![
                "Found 2 art entries",
                "big-wave (2 images) - Title of big-wave",
                "    Source: characters/chomb/big-wave.yml",
                "    Flags: pinned, sketch",
                "test-art (1 image) - Title of test-art",
                "    Source: general/test-art.yml",
            ]
        );
    }

    #[test]
    fn empty_list() {
        assert_eq!(
            format_list(&[], Path::new("/x")),
            vec!["Found 0 art entries"]
        );
    }

    #[test]
    fn list_json_has_summary_fields() {
        let json = format_list_json(&[found("test-art", &["a", "b"], "general/test-art.yml")])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["slug"], "test-art");
        assert_eq!(value[0]["image_count"], 2);
        assert_eq!(
            value[0]["path"],
            "/site/content/art/general/test-art.yml"
        );
    }

    #[test]
    fn record_as_yaml_and_json() {
        let entry = sample_entry("test-art", &["test-art"]);
        let yaml = format_record(&entry, false).unwrap();
        assert!(yaml.contains("slug: test-art"));
        assert!(yaml.contains("created_at: 2024-05-01T12:00:00.000Z"));

        let json = format_record(&entry, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["images"][0]["variants"][0]["label"], "blue");
    }

    #[test]
    fn entry_tree_shows_variants() {
        let lines = format_entry(&sample_entry("duo", &["left", "right"]));
        assert_eq!(
            lines,
            vec![
                "duo (2 images) - Title of duo",
                "    001 left → /art/general/left.png",
                "        variant blue → /art/general/left__blue.png",
                "    002 right → /art/general/right.png",
            ]
        );
    }

    #[test]
    fn deletion_report_lines() {
        let report = DeletionReport {
            tasks: vec![
                ("/art/general/a.png".into(), DeletionOutcome::Removed),
                ("/art/general/b.png".into(), DeletionOutcome::Missing),
                (
                    "relative.png".into(),
                    DeletionOutcome::Failed("not a site-relative path".into()),
                ),
            ],
        };
        let lines = format_deletion_report(&report);
        assert_eq!(lines[0], "    removed /art/general/a.png");
        assert_eq!(lines[1], "    missing /art/general/b.png");
        assert!(lines[2].starts_with("    failed  relative.png"));
        assert_eq!(lines[3], "Removed 1 file, 1 missing, 1 failed");
    }

    #[test]
    fn empty_deletion_report_prints_nothing() {
        assert!(format_deletion_report(&DeletionReport::default()).is_empty());
    }

    #[test]
    fn regen_summary_and_dry_run() {
        let report = RegenReport {
            found: 3,
            processed: 1,
            skipped: 1,
            errors: 1,
            records_updated: 1,
            planned: Vec::new(),
        };
        assert_eq!(
            format_regen_report(&report, false),
            vec![
                "Regenerated 1 of 3 originals",
                "    Up to date: 1",
                "    Errors: 1",
                "    Records updated: 1",
            ]
        );

        let planned = RegenReport {
            found: 1,
            planned: vec![PathBuf::from("/site/public/art/general/a.png")],
            ..RegenReport::default()
        };
        assert_eq!(
            format_regen_report(&planned, true),
            vec![
                "Would regenerate 1 of 1 original",
                "    /site/public/art/general/a.png",
            ]
        );
    }
}
