//! Title-to-identifier conversion.
//!
//! Every identifier the tool writes is derived from something a person typed:
//! artwork slugs come from titles, image ids from image titles, and variant
//! filename parts from variant labels. All of them go through [`slugify`]:
//!
//! - `"Test Art"` → `"test-art"`
//! - `"  Fox & Hound!  "` → `"fox-hound"`
//! - `"Ünïcode"` → `"ncode"` (non-ASCII letters are dropped, not transliterated)
//!
//! The result only ever contains `[a-z0-9-]` with no leading, trailing, or
//! doubled dashes, so applying it twice changes nothing. An input with no
//! usable characters yields an empty string; callers decide what to do then.

/// Convert a display string into a lowercase ASCII identifier.
///
/// Characters are case-folded first, then anything outside `[a-z0-9]`,
/// whitespace, and `-` is dropped. Runs of whitespace and dashes become a
/// single dash, and dashes at either end are trimmed.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_dash = true;
        }
    }

    slug
}

/// Slugify `input`, falling back to `fallback` when nothing usable remains.
pub fn slugify_or(input: Option<&str>, fallback: &str) -> String {
    match input.map(slugify) {
        Some(slug) if !slug.is_empty() => slug,
        _ => fallback.to_string(),
    }
}

/// Whether `candidate` is already in canonical slug form.
pub fn is_slug(candidate: &str) -> bool {
    !candidate.is_empty() && slugify(candidate) == candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_words_joined_with_dashes() {
        assert_eq!(slugify("Test Art"), "test-art");
        assert_eq!(slugify("My Best Sketch"), "my-best-sketch");
    }

    #[test]
    fn punctuation_dropped_without_splitting_words() {
        assert_eq!(slugify("Don't Panic!"), "dont-panic");
        assert_eq!(slugify("a!b"), "ab");
        assert_eq!(slugify("Fox & Hound"), "fox-hound");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(slugify("hello   world"), "hello-world");
        assert_eq!(slugify("tab\tand\nnewline"), "tab-and-newline");
    }

    #[test]
    fn repeated_dashes_collapse() {
        assert_eq!(slugify("a---b"), "a-b");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("a-!-b"), "a-b");
    }

    #[test]
    fn leading_and_trailing_dashes_trimmed() {
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify("  hello  "), "hello");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn empty_and_unusable_input_yields_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn non_ascii_letters_dropped() {
        assert_eq!(slugify("café"), "caf");
        assert_eq!(slugify("München Nights"), "mnchen-nights");
    }

    #[test]
    fn digits_preserved() {
        assert_eq!(slugify("Sketch 2024 #3"), "sketch-2024-3");
    }

    #[test]
    fn slugify_is_idempotent() {
        let inputs = [
            "Test Art",
            "  --Weird__Input--  ",
            "Émile's  café  2",
            "a - - b",
            "",
            "UPPER lower 123",
            "tab\tsep",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn output_alphabet_is_restricted() {
        let inputs = ["Hello, World!", " x ", "a__b", "--", "Ω mega", "1 2 3"];
        for input in inputs {
            let slug = slugify(input);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "bad char in {slug:?}"
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }

    #[test]
    fn slugify_or_uses_fallback_for_empty() {
        assert_eq!(slugify_or(Some("Blue Ink"), "variant-1"), "blue-ink");
        assert_eq!(slugify_or(Some("???"), "variant-1"), "variant-1");
        assert_eq!(slugify_or(None, "variant-2"), "variant-2");
    }

    #[test]
    fn is_slug_checks_canonical_form() {
        assert!(is_slug("test-art"));
        assert!(!is_slug("Test Art"));
        assert!(!is_slug(""));
    }
}
