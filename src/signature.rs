//! The HMAC-SHA1 signature method ([RFC 5849 section 3.4][rfc]).
//!
//! Building the signature base string takes two separate encoding passes:
//! [`Parameters::to_normalized_string`] encodes every key and value, then
//! [`base_string`] encodes each of its three segments again before joining
//! them with `&`.
//!
//! [rfc]: https://tools.ietf.org/html/rfc5849#section-3.4

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use hmac::{Hmac, Mac};
use http::Method;
use sha1::Sha1;
use url::Url;

use crate::encoding::percent_encode;
use crate::error::{SignError, SignResult};
use crate::parameters::Parameters;
use crate::{OAUTH_NONCE_KEY, OAUTH_TIMESTAMP_KEY};

type HmacSha1 = Hmac<Sha1>;

/// Per-request nonce and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    nonce: String,
    timestamp: u64,
}

impl SigningContext {
    pub fn new<T>(nonce: T, timestamp: u64) -> Self
    where
        T: Into<String>,
    {
        SigningContext {
            nonce: nonce.into(),
            timestamp,
        }
    }

    /// A fresh random nonce (32 hex digits) and the current Unix time.
    ///
    /// # Errors
    ///
    /// If the system clock is set before the Unix epoch.
    pub fn generate() -> SignResult<Self> {
        Ok(SigningContext {
            nonce: generate_nonce(),
            timestamp: current_timestamp()?,
        })
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Add `oauth_nonce` and `oauth_timestamp` to `params`.
    pub fn apply(&self, params: &mut Parameters) {
        params.add(OAUTH_NONCE_KEY, self.nonce.as_str());
        params.add(OAUTH_TIMESTAMP_KEY, self.timestamp.to_string());
    }
}

pub(crate) fn generate_nonce() -> String {
    format!("{:032x}", rand::random::<u128>())
}

pub(crate) fn current_timestamp() -> SignResult<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Base string URI: scheme, host, non-default port and path. The query and
/// fragment are dropped.
pub fn normalize_url(url: &Url) -> String {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.into()
}

/// Signature base string: `METHOD&enc(url)&enc(parameter string)`.
pub fn base_string(method: &Method, url: &Url, params: &Parameters) -> String {
    let method = method.as_str().to_uppercase();
    let url = percent_encode(&normalize_url(url));
    let params = percent_encode(&params.to_normalized_string());
    [method, url, params].join("&")
}

/// HMAC-SHA1 over `base`, keyed with `consumer_secret&token_secret`, as
/// unescaped base64.
pub fn sign(consumer_secret: &str, token_secret: &str, base: &str) -> SignResult<String> {
    let key = format!("{}&{}", consumer_secret, token_secret);
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| SignError::InvalidKey)?;
    mac.update(base.as_bytes());
    Ok(BASE64_ENGINE.encode(mac.finalize().into_bytes()))
}
