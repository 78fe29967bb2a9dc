use http::header::{HeaderMap, CONTENT_TYPE};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::MalformedQuery;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// RFC 3986 unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode per RFC 5849 §3.6. Space becomes `%20`, never `+`.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Decode `%XX` escapes. The decoded bytes must be UTF-8.
pub(crate) fn percent_decode(input: &str) -> Result<String, MalformedQuery> {
    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| MalformedQuery(input.to_string()))
}

/// Parse `application/x-www-form-urlencoded` data.
///
/// Unlike `url::form_urlencoded::parse`, a `%` that does not start a
/// two-digit hex escape is rejected rather than passed through, and so is
/// anything that does not decode to UTF-8.
pub(crate) fn parse_form(input: &[u8]) -> Result<Vec<(String, String)>, MalformedQuery> {
    let malformed = || MalformedQuery(String::from_utf8_lossy(input).into_owned());

    let mut bytes = input.iter();
    while let Some(&b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next().ok_or_else(malformed)?;
            let lo = bytes.next().ok_or_else(malformed)?;
            if !hi.is_ascii_hexdigit() || !lo.is_ascii_hexdigit() {
                return Err(malformed());
            }
        }
    }

    // `&`, `=` and `+` are ASCII and split any multi-byte sequence, so the
    // whole input decodes to UTF-8 exactly when every key and value does
    percent_encoding::percent_decode(input)
        .decode_utf8()
        .map_err(|_| malformed())?;

    serde_urlencoded::from_bytes::<Vec<(String, String)>>(input).map_err(|_| malformed())
}

/// Whether the headers declare a form-urlencoded body.
pub(crate) fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(FORM_URLENCODED))
        .unwrap_or(false)
}
