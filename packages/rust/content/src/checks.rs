//! Structural content checks that need no I/O.

use std::sync::LazyLock;

use regex::Regex;

/// A top-level `# Heading` line anywhere in the body.
static MAIN_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+.+$").expect("valid regex"));

/// Body length in characters, ignoring surrounding whitespace.
pub fn content_length(body: &str) -> usize {
    body.trim().chars().count()
}

pub fn meets_min_length(body: &str, min_len: usize) -> bool {
    content_length(body) >= min_len
}

pub fn has_main_heading(body: &str) -> bool {
    MAIN_HEADING_RE.is_match(body)
}
