//! Document header extraction, validation, and body sanitization.
//!
//! The pure (no I/O) stages of document processing:
//! - [`parse_frontmatter`]: split a document into metadata and body
//! - [`validate_frontmatter`]: enforce field rules, normalize `language`
//! - [`sanitize`]: drop script/iframe blocks, collapse blank runs
//! - [`checks`]: structural checks used by the content verdict

pub mod checks;
mod frontmatter;
mod sanitize;
mod validate;

pub use frontmatter::parse_frontmatter;
pub use sanitize::sanitize;
pub use validate::{
    normalize_language, validate_frontmatter, validate_subtitle, validate_tags, validate_title,
};

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_shared::ContentConfig;

    #[test]
    fn header_then_sanitize() {
        let text = "---\ntitle: Test Title\n---\n# Heading\n\n\n\n<script>x()</script>Some content here.";
        let (raw, body) = parse_frontmatter(text).unwrap();
        let fm = validate_frontmatter(&raw, &ContentConfig::default()).unwrap();
        let body = sanitize(body);

        assert_eq!(fm.get_str("title"), Some("Test Title"));
        assert_eq!(fm.get_str("language"), Some("en"));
        assert_eq!(body, "# Heading\n\nSome content here.");
    }
}
