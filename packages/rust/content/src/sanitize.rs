//! Markup sanitization for document bodies.
//!
//! Pure and deterministic: no I/O, and `sanitize(sanitize(x)) == sanitize(x)`.

use std::sync::LazyLock;

use regex::Regex;

/// `<script ...>...</script>` blocks, case-insensitive, spanning lines.
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").expect("valid regex"));

/// `<iframe ...>...</iframe>` blocks, case-insensitive, spanning lines.
static IFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<iframe.*?</iframe>").expect("valid regex"));

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Remove unsafe embedded blocks, then collapse 3+ newlines to exactly 2.
pub fn sanitize(body: &str) -> String {
    let stripped = strip_unsafe_blocks(body);
    collapse_newlines(&stripped)
}

/// Remove script and iframe blocks until none remain.
///
/// A single pass is not enough: removing `<script></script>` from
/// `<scr<script></script>ipt>..</script>` assembles a new block.
fn strip_unsafe_blocks(body: &str) -> String {
    let mut current = body.to_string();
    loop {
        let next = SCRIPT_RE.replace_all(&current, "");
        let next = IFRAME_RE.replace_all(&next, "").into_owned();
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

fn collapse_newlines(body: &str) -> String {
    EXCESS_NEWLINES_RE.replace_all(body, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn removes_script_and_iframe() {
        let html = "<h1>Title</h1><script>alert('xss')</script><iframe src='evil.com'></iframe><p>Content</p>";
        assert_eq!(sanitize(html), "<h1>Title</h1><p>Content</p>");
    }

    #[test]
    fn removal_is_case_insensitive_and_multiline() {
        let body = "# Post\n\n<SCRIPT type=\"text/javascript\">\nlet a = 1;\n</Script>\nafter";
        assert_eq!(sanitize(body), "# Post\n\nafter");
    }

    #[test]
    fn removes_every_occurrence() {
        let body = "a<script>1</script>b<script>2</script>c<iframe>3</iframe>d";
        assert_eq!(sanitize(body), "abcd");
    }

    #[test]
    fn nested_fragments_do_not_survive() {
        let body = "x<scr<script></script>ipt>alert(1)</script>y";
        assert_eq!(sanitize(body), "xy");
    }

    #[test]
    fn unclosed_script_is_left_alone() {
        let body = "text <script> never closed";
        assert_eq!(sanitize(body), body);
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(sanitize("Line 1\n\n\n\n\nLine 2"), "Line 1\n\nLine 2");
        assert_eq!(sanitize("Line 1\n\nLine 2"), "Line 1\n\nLine 2");
        assert_eq!(sanitize("Line 1\nLine 2"), "Line 1\nLine 2");
    }

    #[test]
    fn plain_markdown_is_unchanged() {
        let body = "# Heading\nSome content here that is definitely long enough.";
        assert_eq!(sanitize(body), body);
    }

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("<script>".to_string()),
            Just("</script>".to_string()),
            Just("<SCRIPT src='x'>".to_string()),
            Just("<scr".to_string()),
            Just("ipt>".to_string()),
            Just("<iframe>".to_string()),
            Just("</IFRAME>".to_string()),
            Just("\n".to_string()),
            Just("\r\n".to_string()),
            "[a-z #!\\[\\]()]{0,6}",
        ]
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(parts in prop::collection::vec(fragment(), 0..24)) {
            let input = parts.concat();
            let once = sanitize(&input);
            let twice = sanitize(&once);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_no_long_newline_runs(parts in prop::collection::vec(fragment(), 0..24)) {
            let out = sanitize(&parts.concat());
            prop_assert!(!out.contains("\n\n\n"));
        }
    }
}
