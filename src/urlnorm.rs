//! Locator normalization for manifest URLs.
//!
//! Manifest producers are inconsistent about escaping: a locator may arrive
//! raw (`my photo.png`), escaped once (`my%20photo.png`) or escaped several
//! times (`my%2520photo.png`). [`normalize_locator`] peels every redundant
//! layer, resolves the last one, and escapes the result exactly once, so all
//! three spellings above end up as `my%20photo.png`.
//!
//! Decoding is strict: a stray `%` or an escape sequence that does not
//! decode to UTF-8 aborts normalization and the raw locator is used as is.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;
use thiserror::Error;

/// Characters left untouched when escaping a whole URI: unreserved marks
/// plus the URI delimiters.
const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Characters left untouched when escaping a single URI component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// An escaped percent sign; its presence means at least one extra layer.
const ESCAPED_PERCENT: &str = "%25";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("malformed escape sequence at byte {0}")]
    MalformedEscape(usize),
    #[error("escaped bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Result of [`normalize_locator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLocator {
    /// Locator escaped exactly once, safe to fetch. Equal to the raw input
    /// when normalization failed.
    pub encoded: String,
    /// Fully unescaped locator, `None` when normalization failed.
    pub decoded: Option<String>,
}

/// Normalize a possibly multiply-escaped locator. Never fails: a decode
/// error falls back to the raw string.
pub fn normalize_locator(raw: &str) -> NormalizedLocator {
    match fully_decode(raw) {
        Ok(decoded) => NormalizedLocator {
            encoded: encode_uri(&decoded),
            decoded: Some(decoded),
        },
        Err(err) => {
            tracing::debug!(locator = raw, error = %err, "locator left unnormalized");
            NormalizedLocator {
                encoded: raw.to_string(),
                decoded: None,
            }
        }
    }
}

fn fully_decode(raw: &str) -> Result<String, NormalizeError> {
    let mut current = raw.to_string();
    while current.contains(ESCAPED_PERCENT) {
        current = decode_once(&current)?;
    }
    decode_once(&current)
}

/// Decode one layer of percent escapes, failing on malformed sequences.
pub fn decode_once(input: &str) -> Result<String, NormalizeError> {
    // percent_decode passes malformed escapes through; reject them first.
    let bytes = input.as_bytes();
    for (i, _) in input.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(NormalizeError::MalformedEscape(i));
        }
    }
    percent_decode_str(input)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| NormalizeError::InvalidUtf8)
}

/// Escape a whole URI, keeping its delimiters.
pub fn encode_uri(input: &str) -> String {
    utf8_percent_encode(input, URI).to_string()
}

/// Escape a single URI component (used for suggested download filenames).
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_escaped_space() {
        let n = normalize_locator("foo%2520bar.png");
        assert_eq!(n.encoded, "foo%20bar.png");
        assert_eq!(n.decoded.as_deref(), Some("foo bar.png"));
    }

    #[test]
    fn single_escaped_is_unchanged() {
        assert_eq!(normalize_locator("foo%20bar.png").encoded, "foo%20bar.png");
    }

    #[test]
    fn raw_space_is_escaped_once() {
        assert_eq!(
            normalize_locator("images/my photo.png").encoded,
            "images/my%20photo.png"
        );
    }

    #[test]
    fn triple_escaped() {
        assert_eq!(normalize_locator("a%252520b.png").encoded, "a%20b.png");
    }

    #[test]
    fn absolute_url_keeps_delimiters() {
        let n = normalize_locator("https://example.com/img/a b.png?w=100&h=50#top");
        assert_eq!(n.encoded, "https://example.com/img/a%20b.png?w=100&h=50#top");
    }

    #[test]
    fn non_ascii_is_escaped_as_utf8() {
        assert_eq!(normalize_locator("café.png").encoded, "caf%C3%A9.png");
        assert_eq!(normalize_locator("caf%C3%A9.png").encoded, "caf%C3%A9.png");
    }

    #[test]
    fn malformed_escape_falls_back_to_raw() {
        let n = normalize_locator("50%off.png");
        assert_eq!(n.encoded, "50%off.png");
        assert_eq!(n.decoded, None);
    }

    #[test]
    fn truncated_escape_falls_back_to_raw() {
        assert_eq!(normalize_locator("photo%2").encoded, "photo%2");
    }

    #[test]
    fn invalid_utf8_falls_back_to_raw() {
        assert_eq!(normalize_locator("bad%FF.png").encoded, "bad%FF.png");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "foo%2520bar.png",
            "plain.png",
            "dir/sub dir/x.png",
            "caf%C3%A9.png",
            "https://example.com/a%20b?q=1",
            "100%25%2520done.png",
        ] {
            let once = normalize_locator(raw).encoded;
            let twice = normalize_locator(&once).encoded;
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn decode_once_reports_position() {
        assert_eq!(decode_once("ab%zz"), Err(NormalizeError::MalformedEscape(2)));
        assert_eq!(decode_once("a%4"), Err(NormalizeError::MalformedEscape(1)));
    }

    #[test]
    fn decode_once_accepts_either_hex_case() {
        assert_eq!(decode_once("%41%4a%4A").unwrap(), "AJJ");
        assert_eq!(decode_once("caf%C3%A9.png").unwrap(), "café.png");
    }

    #[test]
    fn component_escapes_delimiters() {
        assert_eq!(encode_component("a b/c?.png"), "a%20b%2Fc%3F.png");
        assert_eq!(encode_component("it's (1).png"), "it's%20(1).png");
    }
}
