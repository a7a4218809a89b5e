//! Query string parameter extraction
//!
//! Pairs are split on `&`; `+` decodes to a space and `%XX` escapes are
//! percent-decoded. Pairs with a malformed escape or a `;` are skipped rather
//! than failing the whole query.

use percent_encoding::percent_decode_str;

/// Return the first value of `key` in `query`, decoded.
///
/// An empty value is still returned as `Some("")`; callers decide whether
/// that counts as missing.
pub fn first_value(query: Option<&str>, key: &str) -> Option<String> {
    query?
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.contains(';'))
        .filter_map(|pair| {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            Some((unescape(raw_key)?, unescape(raw_value)?))
        })
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

/// Decode one query component, `None` on a malformed escape or invalid UTF-8
fn unescape(component: &str) -> Option<String> {
    if !has_valid_escapes(component) {
        return None;
    }
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

fn has_valid_escapes(component: &str) -> bool {
    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
