//! Flat-text parsing primitives for asset descriptors.
//!
//! One dialect only: ordered `key<delim>value` entries in a flat blob,
//! plus the positive-integer lists and inline base64 data that animation
//! descriptors embed. Anything fancier is out of scope.

#![allow(dead_code)]

use std::collections::HashMap;

use base64::Engine as _;
use log::warn;

/// MIME prefix tolerated (and stripped) in front of inline frame data.
const BASE64_MIME_PREFIX: &str = "data:image/png;base64,";

/// Splits `text` into entries at every `entry_delim`, then each entry at
/// the FIRST `kv_delim` into key and trailing value. The value may itself
/// contain the key/value delimiter; it is not split further. Duplicate
/// keys overwrite (last occurrence wins). Entries without the key/value
/// delimiter, including a trailing remnant after the last entry
/// delimiter, are silently dropped.
pub fn parse_dictionary(
    text: &str,
    entry_delim: &str,
    kv_delim: &str,
) -> HashMap<String, String> {
    let mut dict = HashMap::new();
    for entry in text.split(entry_delim) {
        if let Some((key, value)) = entry.split_once(kv_delim) {
            dict.insert(key.to_string(), value.to_string());
        }
    }
    dict
}

/// True when every character is an ASCII digit.
///
/// The empty string has no non-digit characters and is therefore true;
/// callers that care must reject empty tokens themselves.
pub fn is_positive_int(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// How [`parse_positive_int_list`] treats the segment after the last
/// delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingSegment {
    /// Parse the final segment like any other.
    Parse,
    /// Drop the final segment unparsed. Compatibility mode for lists that
    /// terminate every element with the delimiter ("0,1,2,").
    Discard,
}

/// Splits `s` on `delim` and parses each token as a positive integer.
/// Non-numeric tokens are skipped with a warning; empty tokens are
/// skipped silently.
pub fn parse_positive_int_list(s: &str, delim: &str, trailing: TrailingSegment) -> Vec<u32> {
    let mut tokens: Vec<&str> = s.split(delim).collect();
    if trailing == TrailingSegment::Discard {
        tokens.pop();
    }

    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if !is_positive_int(token) {
            warn!("skipping non-numeric list token {:?}", token);
            continue;
        }
        match token.parse::<u32>() {
            Ok(n) => out.push(n),
            Err(_) => warn!("skipping out-of-range list token {:?}", token),
        }
    }
    out
}

/// Decodes standard-alphabet base64, tolerating an optional
/// `data:image/png;base64,` prefix and surrounding whitespace.
pub fn decode_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let data = s.strip_prefix(BASE64_MIME_PREFIX).unwrap_or(s);
    base64::engine::general_purpose::STANDARD.decode(data.trim())
}
