use crate::encoding::{percent_decode, percent_encode};
use crate::error::{HeaderError, HeaderResult, MalformedQuery};
use crate::parameters::Parameters;
use crate::REALM_KEY;

const OAUTH_SCHEME: &str = "OAuth";

/// Render `OAuth k1="v1", k2="v2", ...` in canonical parameter order.
pub fn format_header(params: &Parameters) -> String {
    format_header_with_realm(None, params)
}

/// Like [`format_header`], with an optional leading `realm` entry.
pub fn format_header_with_realm(realm: Option<&str>, params: &Parameters) -> String {
    let realm = realm.map(|realm| (REALM_KEY.to_string(), percent_encode(realm)));
    let pairs = realm
        .into_iter()
        .chain(params.encoded_pairs())
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect::<Vec<_>>();
    format!("{} {}", OAUTH_SCHEME, pairs.join(", "))
}

/// Parse an `Authorization` header value produced by [`format_header`].
///
/// Keys and values come back percent-decoded.
pub fn parse_header(value: &str) -> HeaderResult<Parameters> {
    let rest = value
        .strip_prefix(OAUTH_SCHEME)
        .ok_or_else(|| HeaderError::MissingScheme(value.to_string()))?;
    if rest.is_empty() {
        return Ok(Parameters::new());
    }
    let rest = rest
        .strip_prefix(' ')
        .ok_or_else(|| HeaderError::MissingScheme(value.to_string()))?;

    let mut params = Parameters::new();
    for pair in rest.split(", ") {
        let mut parts = pair.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(quoted), None) => {
                let malformed = |_: MalformedQuery| HeaderError::MalformedPair(pair.to_string());
                let key = percent_decode(key).map_err(malformed)?;
                let value = percent_decode(quoted.trim_matches('"')).map_err(malformed)?;
                params.add(key, value);
            }
            _ => return Err(HeaderError::MalformedPair(pair.to_string())),
        }
    }
    Ok(params)
}
