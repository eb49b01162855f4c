//! Frontmatter block detection and decoding.
//!
//! A document carries metadata when its very first line is exactly `---`.
//! The block runs until a later line that is exactly `---` and ends in a line
//! break; everything after that closing line is the body. The closing line can
//! never be the second line of the document, so `---\n---\n` is plain text.

use serde_yaml::{Mapping, Value};
use tracing::{debug, error};

use inkpress_shared::{Frontmatter, InkpressError, Result};

/// Delimiter line for the metadata block.
const DELIMITER: &str = "---";

/// Split `text` into its decoded metadata block and the remaining body.
///
/// Text without a leading metadata block yields an empty [`Frontmatter`] and
/// the original text. A block that does not decode as a YAML mapping is a
/// [`InkpressError::Frontmatter`]; no partial metadata is returned.
pub fn parse_frontmatter(text: &str) -> Result<(Frontmatter, &str)> {
    let Some((block, body)) = split_block(text) else {
        debug!("no frontmatter block");
        return Ok((Frontmatter::new(), text));
    };

    let frontmatter = decode_block(block)?;
    debug!(fields = frontmatter.len(), body_len = body.len(), "frontmatter parsed");
    Ok((frontmatter, body))
}

/// Locate the raw block and body. Returns `None` if the document has no block.
fn split_block(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if !is_delimiter(first) || !first.ends_with('\n') {
        return None;
    }

    let block_start = first.len();
    let mut offset = block_start;

    for line in lines {
        let line_end = offset + line.len();
        if offset > block_start && is_delimiter(line) && line.ends_with('\n') {
            return Some((&text[block_start..offset], &text[line_end..]));
        }
        offset = line_end;
    }

    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\n').trim_end_matches('\r') == DELIMITER
}

fn decode_block(block: &str) -> Result<Frontmatter> {
    let value: Value = serde_yaml::from_str(block).map_err(|e| {
        error!(error = %e, "error parsing frontmatter");
        InkpressError::frontmatter(format!("error parsing frontmatter: {e}"))
    })?;

    match value {
        Value::Mapping(mapping) => {
            if let Some(key) = mapping.keys().find(|k| !k.is_string()) {
                return Err(InkpressError::frontmatter(format!(
                    "frontmatter keys must be strings, found {key:?}"
                )));
            }
            Ok(Frontmatter::from(mapping))
        }
        // An empty block (`---\n\n---\n`) decodes to null.
        Value::Null => Ok(Frontmatter::from(Mapping::new())),
        other => Err(InkpressError::frontmatter(format!(
            "frontmatter must be a key/value mapping, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
