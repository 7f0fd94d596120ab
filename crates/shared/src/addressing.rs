//! One-on-one addressing inside chat text
//!
//! The engine has no dedicated one-on-one action. A message meant for a
//! single character travels as ordinary chat prefixed with `[Name에게]`,
//! the only tag the engine routes on. The English `[To Name]` form is
//! still recognized when reading transcripts.

const PREFIX: &str = "To ";
const SUFFIX: &str = "에게";

/// Prefix `text` with an address tag for `recipient`.
pub fn address(recipient: &str, text: &str) -> String {
    format!("[{}{}] {}", recipient.trim(), SUFFIX, text.trim())
}

/// Split addressed chat into `(recipient, text)`.
///
/// Returns `None` when the content carries no recognizable address tag.
pub fn parse_addressed(content: &str) -> Option<(&str, &str)> {
    let rest = content.trim_start().strip_prefix('[')?;
    let (tag, text) = rest.split_once(']')?;
    let recipient = tag
        .strip_prefix(PREFIX)
        .or_else(|| tag.strip_suffix(SUFFIX))?
        .trim();
    if recipient.is_empty() {
        return None;
    }
    Some((recipient, text.trim()))
}
