//! Frontmatter validation and normalization.
//!
//! Validation is fail-fast: the first violated rule is returned and later
//! fields are not inspected. The input mapping is never modified; callers get
//! a normalized copy.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;
use tracing::warn;

use inkpress_shared::{ContentConfig, Frontmatter, InkpressError, Result, scalar_to_string};

/// Allowed characters for a single tag.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("tag regex"));

/// Validate `raw` against `rules` and return a normalized copy.
///
/// The returned mapping always has a supported `language`.
pub fn validate_frontmatter(raw: &Frontmatter, rules: &ContentConfig) -> Result<Frontmatter> {
    let mut validated = raw.clone();

    let language = normalize_language(raw.get("language"), rules);
    validated.insert("language", language);

    if let Some(title) = raw.get("title") {
        validate_title(title, rules)?;
    }

    if let Some(subtitle) = raw.get("subtitle") {
        validate_subtitle(subtitle, rules)?;
    }

    if let Some(tags) = raw.get("tags") {
        validate_tags(tags, rules)?;
    }

    Ok(validated)
}

/// Reduce a language value to its supported primary subtag.
///
/// `en-US` becomes `en`. Missing, empty, or unsupported values fall back to the
/// configured default; an unsupported value is logged, never rejected.
pub fn normalize_language(value: Option<&Value>, rules: &ContentConfig) -> String {
    let raw = match value.and_then(scalar_to_string) {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return rules.default_language.clone(),
    };

    let primary = raw
        .trim()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if rules.supported_languages.iter().any(|l| *l == primary) {
        primary
    } else {
        warn!(
            language = %primary,
            default = %rules.default_language,
            "unsupported language, falling back to default"
        );
        rules.default_language.clone()
    }
}

/// A present title must be a non-empty string within the length bound.
pub fn validate_title(value: &Value, rules: &ContentConfig) -> Result<()> {
    let title = match value {
        Value::Null => "",
        Value::String(s) => s.as_str(),
        _ => return Err(InkpressError::validation("Title must be a string")),
    };

    if title.is_empty() {
        return Err(InkpressError::validation("Title cannot be empty"));
    }
    if title.chars().count() > rules.max_title_length {
        return Err(InkpressError::validation(format!(
            "Title exceeds maximum length of {} characters",
            rules.max_title_length
        )));
    }
    Ok(())
}

/// Subtitles may be empty but share the length rule with titles.
pub fn validate_subtitle(value: &Value, rules: &ContentConfig) -> Result<()> {
    let subtitle = match value {
        Value::Null => return Ok(()),
        Value::String(s) => s,
        _ => return Err(InkpressError::validation("Subtitle must be a string")),
    };

    if subtitle.chars().count() > rules.max_subtitle_length {
        return Err(InkpressError::validation(format!(
            "Subtitle exceeds maximum length of {} characters",
            rules.max_subtitle_length
        )));
    }
    Ok(())
}

/// Tags must be a list of at most `max_tags` scalars matching `[A-Za-z0-9-]+`.
pub fn validate_tags(value: &Value, rules: &ContentConfig) -> Result<()> {
    let tags = match value {
        Value::Null => return Ok(()),
        Value::Sequence(tags) => tags,
        _ => return Err(InkpressError::validation("Tags must be a list")),
    };

    if tags.len() > rules.max_tags {
        return Err(InkpressError::validation(format!(
            "Maximum {} tags allowed",
            rules.max_tags
        )));
    }

    for tag in tags {
        let Some(text) = scalar_to_string(tag) else {
            return Err(InkpressError::validation(format!(
                "Invalid tag format: {tag:?}"
            )));
        };
        if !TAG_RE.is_match(&text) {
            return Err(InkpressError::validation(format!(
                "Invalid tag format: {text}"
            )));
        }
    }
    Ok(())
}
