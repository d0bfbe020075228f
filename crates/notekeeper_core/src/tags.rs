//! Tag codec for the single `notes.tags` storage column.
//!
//! # Responsibility
//! - Encode an ordered tag sequence into one TEXT value and back.
//!
//! # Invariants
//! - Encoding is length-prefixed (`<byte_len>:<tag>` repeated), so tags may
//!   contain any character, including `,` and `:`.
//! - The empty sequence encodes to `""` and `""` decodes to `[]`.
//! - `decode(encode(tags)) == tags` for every input, order included.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to decode a persisted tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCodecError {
    pub position: usize,
    pub message: &'static str,
}

impl Display for TagCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed tag encoding at byte {}: {}",
            self.position, self.message
        )
    }
}

impl Error for TagCodecError {}

/// Encodes tags preserving order.
pub fn encode_tags(tags: &[String]) -> String {
    let mut encoded = String::new();
    for tag in tags {
        encoded.push_str(&tag.len().to_string());
        encoded.push(':');
        encoded.push_str(tag);
    }
    encoded
}

/// Decodes a value produced by [`encode_tags`].
pub fn decode_tags(encoded: &str) -> Result<Vec<String>, TagCodecError> {
    let mut tags = Vec::new();
    let mut cursor = 0;

    while cursor < encoded.len() {
        let rest = &encoded[cursor..];
        let colon = rest.find(':').ok_or(TagCodecError {
            position: cursor,
            message: "missing length separator",
        })?;
        let digits = &rest[..colon];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TagCodecError {
                position: cursor,
                message: "invalid length prefix",
            });
        }
        let len: usize = digits.parse().map_err(|_| TagCodecError {
            position: cursor,
            message: "length prefix out of range",
        })?;

        let start = cursor + colon + 1;
        let end = start.checked_add(len).ok_or(TagCodecError {
            position: cursor,
            message: "length prefix out of range",
        })?;
        let tag = encoded.get(start..end).ok_or(TagCodecError {
            position: start,
            message: "tag length exceeds value or splits a character",
        })?;
        tags.push(tag.to_string());
        cursor = end;
    }

    Ok(tags)
}
