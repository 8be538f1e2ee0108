//! Filesystem-safe names for exported files.
//!
//! Titles come straight from the PDF text layer and may contain accents,
//! apostrophes, slashes or symbols. [`slugify`] reduces them to
//! `[a-z0-9_-]`, and [`group_filename`] prefixes the group's position so two
//! documents with the same title never collide.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Default maximum slug length.
pub const MAX_SLUG_LEN: usize = 80;

/// Used when nothing survives slugification.
const FALLBACK_SLUG: &str = "document";

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// ASCII slug of `value`, at most `max_len` characters.
///
/// Accents are decomposed and dropped (`é` → `e`), other non-ASCII characters
/// disappear, whitespace runs become a single `-`.
pub fn slugify(value: &str, max_len: usize) -> String {
    let value = if value.is_empty() { FALLBACK_SLUG } else { value };

    let ascii: String = value
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_ascii_lowercase();
    let kept = RE_DISALLOWED.replace_all(&ascii, "");
    let hyphenated = RE_WHITESPACE.replace_all(&kept, "-");

    let slug = match hyphenated.trim_matches('-') {
        "" => FALLBACK_SLUG,
        s => s,
    };

    // Only ASCII is left, so byte slicing is char slicing.
    if slug.len() > max_len {
        slug[..max_len].trim_end_matches('-').to_string()
    } else {
        slug.to_string()
    }
}

/// `NN-<slug>.pdf` for the 1-based group `index`.
///
/// Empty titles fall back to `document-<index>`.
pub fn group_filename(index: usize, title: &str, max_len: usize) -> String {
    let slug = if title.is_empty() {
        slugify(&format!("document-{index}"), max_len)
    } else {
        slugify(title, max_len)
    };
    format!("{index:02}-{slug}.pdf")
}

/// `<slug>.zip` for an archive base name; empty names become `extracted`.
pub fn archive_filename(basename: &str, max_len: usize) -> String {
    let basename = if basename.is_empty() { "extracted" } else { basename };
    format!("{}.zip", slugify(basename, max_len))
}
