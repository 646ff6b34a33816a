// src/sanitize.rs
//! Filename sanitization for video titles.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Maximum length of a sanitized filename stem, in characters.
const MAX_STEM_CHARS: usize = 200;

static FORBIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid forbidden-char pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Turn an arbitrary video title into a filesystem-safe filename stem.
///
/// Strips the characters that are hostile on common filesystems, collapses
/// whitespace runs to a single `_`, and caps the result at 200 characters.
/// Total over all inputs and idempotent; may return an empty string (callers
/// supply a fallback stem).
pub fn sanitize_filename(title: &str) -> String {
    let stripped = FORBIDDEN.replace_all(title, "");
    let joined = WHITESPACE.replace_all(stripped.trim(), "_");
    joined.chars().take(MAX_STEM_CHARS).collect()
}
