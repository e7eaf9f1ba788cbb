//! Encoding of cloud paths for inclusion in request URLs.
//!
//! Each `/`-separated segment is encoded on its own in
//! `application/x-www-form-urlencoded` style: ASCII alphanumerics and `-_.`
//! pass through, a space becomes `+`, and every other byte of the UTF-8
//! representation becomes `%XX` with uppercase hex. Slashes are never
//! escaped, so the folder structure survives.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes escaped inside a segment. Space is in the set and is rewritten to
/// `+` afterwards; a literal `+` is escaped to `%2B` first, so the rewrite
/// cannot collide with it.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Encode a single path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT)
        .to_string()
        .replace("%20", "+")
}

/// Encode a full cloud path segment by segment, preserving every `/`.
///
/// Leading, trailing and repeated slashes produce empty segments, which
/// encode to empty strings, so they are kept as-is.
pub fn encode_path(path: &str) -> String {
    path.split('/').map(encode_segment).collect::<Vec<_>>().join("/")
}
