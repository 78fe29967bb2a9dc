use http::Request;

use crate::encoding::{is_form_urlencoded, parse_form, percent_encode};
use crate::error::SignResult;
use crate::{
    OAUTH_CONSUMER_KEY, OAUTH_KEY_PREFIX, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_VERSION_KEY,
    SIGNATURE_METHOD_HMAC_SHA1, VERSION_1_0,
};

/// Ordered multi-map of request and protocol parameters.
///
/// Values are kept decoded; they are percent-encoded exactly once when the
/// normalized parameter string or the `Authorization` header is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pairs: Vec<(String, String)>,
}

impl Parameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// Collect the parameters a signature covers: the form body (when the
    /// request declares one), the URI query, and the fixed protocol
    /// parameters for `consumer_key`.
    ///
    /// The body is only borrowed, so it is still intact for transmission.
    ///
    /// # Errors
    ///
    /// Fails with [`SignError::MalformedQuery`](crate::SignError::MalformedQuery)
    /// when the query or the form body holds an invalid percent escape or
    /// does not decode to UTF-8.
    pub fn from_request<B>(request: &Request<B>, consumer_key: &str) -> SignResult<Self>
    where
        B: AsRef<[u8]>,
    {
        let mut params = Parameters::new();
        if is_form_urlencoded(request.headers()) {
            params.extend(parse_form(request.body().as_ref())?);
        }
        if let Some(query) = request.uri().query() {
            params.extend(parse_form(query.as_bytes())?);
        }
        params.add(OAUTH_CONSUMER_KEY, consumer_key);
        params.add(OAUTH_SIGNATURE_METHOD_KEY, SIGNATURE_METHOD_HMAC_SHA1);
        params.add(OAUTH_VERSION_KEY, VERSION_1_0);
        Ok(params)
    }

    /// Append a value; existing values for `key` are kept.
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded pairs in canonical order: by encoded key, then by
    /// encoded value.
    pub fn encoded_pairs(&self) -> Vec<(String, String)> {
        let mut encoded = self
            .pairs
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>();
        encoded.sort();
        encoded
    }

    /// The normalized parameter string of RFC 5849 §3.4.1.3.2.
    ///
    /// This is the first of the two encoding passes; the signature base
    /// string encodes the result once more.
    pub fn to_normalized_string(&self) -> String {
        self.encoded_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Only the `oauth_*` protocol parameters.
    pub fn protocol_parameters(&self) -> Parameters {
        self.iter()
            .filter(|(k, _)| k.starts_with(OAUTH_KEY_PREFIX))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}
