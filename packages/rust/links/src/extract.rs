//! Hyperlink extraction.
//!
//! Targets come from the Markdown event stream, so links written inside code
//! spans or fenced blocks are never reported. Anchors in raw HTML are parsed
//! with `scraper`.

use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag};
use scraper::{Html, Selector};
use url::Url;

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Every link target referenced in `body`, in document order, unfiltered.
pub fn extract_link_targets(body: &str) -> Vec<String> {
    let mut targets = Vec::new();

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Link(_, dest, _)) => targets.push(dest.to_string()),
            Event::Html(html) => targets.extend(html_anchor_targets(&html)),
            _ => {}
        }
    }

    targets
}

/// Absolute `http`/`https` targets worth probing, deduplicated, document order.
///
/// Fragments, relative paths, `mailto:` and other schemes are dropped.
pub fn probe_targets(body: &str) -> Vec<Url> {
    let mut seen = HashSet::new();
    extract_link_targets(body)
        .into_iter()
        .filter_map(|target| Url::parse(target.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

fn html_anchor_targets(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&ANCHOR_SEL)
        .filter_map(|a| a.value().attr("href"))
        .map(String::from)
        .collect()
}
