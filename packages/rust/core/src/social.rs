//! Short announcement text for social platforms.

use inkpress_shared::Frontmatter;

use crate::publish::FALLBACK_TITLE;

/// Compose an announcement for a published document.
///
/// `links` are `(label, url)` pairs rendered as `Read it on <label>: <url>`.
/// With `max_len`, an over-long message has its summary cut (ending in `...`)
/// to fill the room left by the link lines, and loses its hashtags. When not
/// even that fits, only the link lines are returned. Lengths count characters.
pub fn compose_social_message(
    frontmatter: &Frontmatter,
    links: &[(String, String)],
    max_len: Option<usize>,
) -> String {
    let content = message_content(frontmatter);
    let hashtags = hashtags(&frontmatter.tags());
    let link_lines = links
        .iter()
        .map(|(label, url)| format!("Read it on {label}: {url}"))
        .collect::<Vec<_>>()
        .join("\n");
    let links_block = if link_lines.is_empty() {
        String::new()
    } else {
        format!("\n\n{link_lines}")
    };

    let mut message = content.clone();
    if !hashtags.is_empty() {
        message.push(' ');
        message.push_str(&hashtags);
    }
    message.push_str(&links_block);

    let max_len = match max_len {
        Some(max) if max > 0 && char_len(&message) > max => max,
        _ => return message,
    };

    let links_len = char_len(&links_block);
    let Some(available) = max_len.checked_sub(links_len + 3).filter(|n| *n > 0) else {
        return link_lines;
    };

    format!("{}...{links_block}", take_chars(&content, available))
}

/// `summary`, else `title`, else the fallback title.
fn message_content(frontmatter: &Frontmatter) -> String {
    ["summary", "title"]
        .iter()
        .find_map(|key| frontmatter.get(key).and_then(inkpress_shared::scalar_to_string))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// `#tag` for each tag, hyphens removed, space separated.
fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag.replace('-', "")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
