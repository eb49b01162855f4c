//! Embedded-image scanner.
//!
//! Produces one [`ImageReference`] per embedded image, in document order, with
//! an explicit half-open byte span. References come from the Markdown event
//! stream, so images inside code spans or fenced blocks are never reported.

use std::ops::Range;

use pulldown_cmark::{Event, Parser, Tag};

/// One embedded image found in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Position in document order.
    pub index: usize,
    /// Alt text exactly as written.
    pub alt: String,
    /// Local path or remote URL.
    pub source: String,
    /// Optional image title (`![alt](src "title")`), preserved on rewrite.
    pub title: Option<String>,
    /// Byte range `[start, end)` of the whole image markup.
    pub span: Range<usize>,
}

impl ImageReference {
    /// Markdown for this image pointing at `url`.
    pub fn render_with(&self, url: &str) -> String {
        match &self.title {
            Some(title) => format!("![{}]({url} \"{}\")", self.alt, title.replace('"', "\\\"")),
            None => format!("![{}]({url})", self.alt),
        }
    }
}

/// An image whose end event has not been seen yet.
struct OpenImage {
    span: Range<usize>,
    source: String,
    title: Option<String>,
    alt_end: usize,
}

/// Scan `body` for embedded images.
///
/// Images nested in another image's alt text belong to the outer one and are
/// not reported on their own, so spans never overlap.
pub fn scan_images(body: &str) -> Vec<ImageReference> {
    let mut refs = Vec::new();
    let mut open: Option<OpenImage> = None;
    let mut depth = 0usize;

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Image(_, dest, title)) => {
                if depth == 0 {
                    open = Some(OpenImage {
                        alt_end: range.start + 2,
                        span: range,
                        source: dest.to_string(),
                        title: (!title.is_empty()).then(|| title.to_string()),
                    });
                }
                depth += 1;
            }
            Event::End(Tag::Image(..)) => {
                depth = depth.saturating_sub(1);
                if depth > 0 {
                    extend_alt(&mut open, range.end);
                } else if let Some(image) = open.take() {
                    let alt_end = image.alt_end.min(image.span.end);
                    refs.push(ImageReference {
                        index: refs.len(),
                        alt: body[image.span.start + 2..alt_end].to_string(),
                        source: image.source,
                        title: image.title,
                        span: image.span,
                    });
                }
            }
            _ if depth > 0 => extend_alt(&mut open, range.end),
            _ => {}
        }
    }

    refs
}

fn extend_alt(open: &mut Option<OpenImage>, end: usize) {
    if let Some(image) = open.as_mut() {
        image.alt_end = image.alt_end.max(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(body: &str) -> Vec<String> {
        scan_images(body).into_iter().map(|r| r.source).collect()
    }

    #[test]
    fn finds_images_in_order_with_spans() {
        let body = "Intro ![one](a.png) middle ![two](https://x.test/b.jpg) end";
        let refs = scan_images(body);

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].index, 0);
        assert_eq!(refs[0].alt, "one");
        assert_eq!(refs[0].source, "a.png");
        assert_eq!(&body[refs[0].span.clone()], "![one](a.png)");
        assert_eq!(refs[1].index, 1);
        assert_eq!(refs[1].source, "https://x.test/b.jpg");
        assert_eq!(&body[refs[1].span.clone()], "![two](https://x.test/b.jpg)");
        assert!(refs[0].span.end <= refs[1].span.start);
    }

    #[test]
    fn empty_alt_and_title() {
        let refs = scan_images("![](pic.png \"A caption\")");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].alt, "");
        assert_eq!(refs[0].source, "pic.png");
        assert_eq!(refs[0].title.as_deref(), Some("A caption"));
        assert_eq!(
            refs[0].render_with("https://cdn.test/p.png"),
            "![](https://cdn.test/p.png \"A caption\")"
        );
    }

    #[test]
    fn alt_keeps_inline_markup() {
        let body = "![a *bold* `move`](x.png)";
        let refs = scan_images(body);
        assert_eq!(refs[0].alt, "a *bold* `move`");
        assert_eq!(refs[0].render_with("u"), "![a *bold* `move`](u)");
    }

    #[test]
    fn plain_links_are_not_images() {
        assert!(scan_images("[text](https://example.com) and ![broken] (x.png)").is_empty());
    }

    #[test]
    fn linked_image_is_still_an_image() {
        let body = "[![badge](https://ci.test/b.svg)](https://ci.test/)";
        let refs = scan_images(body);
        assert_eq!(refs.len(), 1);
        assert_eq!(&body[refs[0].span.clone()], "![badge](https://ci.test/b.svg)");
    }

    #[test]
    fn skips_fenced_and_inline_code() {
        let body = "![a](1.png)\n```md\n![b](2.png)\n```\n~~~\n![c](3.png)\n~~~\nSee `![e](5.png)`.\n\n![d](4.png)";
        assert_eq!(sources(body), vec!["1.png", "4.png"]);
    }

    #[test]
    fn backticks_in_info_string_do_not_open_a_fence() {
        let body = "```inline``` is just code\n\n![a](1.png)\n![b](2.png)\n";
        assert_eq!(sources(body), vec!["1.png", "2.png"]);
    }

    #[test]
    fn shorter_fence_does_not_close_longer_one() {
        let body = "````md\n```\n![hidden](x.png)\n```\n````\n![after](y.png)\n";
        assert_eq!(sources(body), vec!["y.png"]);
    }

    #[test]
    fn unterminated_fence_hides_rest() {
        let body = "![a](1.png)\n\n```\n![b](2.png)\n";
        assert_eq!(sources(body), vec!["1.png"]);
    }

    #[test]
    fn nested_image_belongs_to_outer() {
        let body = "![outer ![inner](i.png)](o.png)";
        let refs = scan_images(body);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source, "o.png");
        assert_eq!(refs[0].span, 0..body.len());
    }

    #[test]
    fn multibyte_text_keeps_valid_spans() {
        let body = "Café ☕ ![naïve](bild.png) fin";
        let refs = scan_images(body);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].alt, "naïve");
        assert_eq!(&body[refs[0].span.clone()], "![naïve](bild.png)");
    }
}
