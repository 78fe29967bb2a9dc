use std::time::SystemTimeError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;
pub type CallbackResult<T> = std::result::Result<T, CallbackError>;
pub type HeaderResult<T> = std::result::Result<T, HeaderError>;

/// Boxed failure raised by a custom [`RequestSender`](crate::RequestSender).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("authorization callback rejected : {0}")]
    Callback(#[from] CallbackError),
    #[error("malformed OAuth header : {0}")]
    Header(#[from] HeaderError),
    #[error("invalid endpoint url : {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("request failed : {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    /// Wraps a failure of a custom transport.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(err.into())
    }
}

/// Form-urlencoded input (query string, form body, provider response)
/// holding an invalid percent escape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid percent-encoding in {0:?}")]
pub struct MalformedQuery(pub String);

#[derive(Error, Debug)]
pub enum SignError {
    #[error("malformed request parameters : {0}")]
    MalformedQuery(#[from] MalformedQuery),
    #[error("request uri {0} is not an absolute url")]
    InvalidUrl(String),
    #[error("generated Authorization header is not a valid header value")]
    InvalidHeader,
    #[error("failed to compute time since Unix Epoch : {0}")]
    Clock(#[from] SystemTimeError),
    /// Not produced by HMAC-SHA1, which accepts keys of any length.
    #[error("HMAC-SHA1 rejected the signing key")]
    InvalidKey,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenReaderError {
    #[error("server returned unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("response has malformed format : {0}")]
    MalformedResponse(#[from] MalformedQuery),
    #[error("response missing {0}")]
    MissingCredentials(&'static str),
    #[error("oauth_callback_confirmed was not true")]
    CallbackNotConfirmed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("request missing {0}")]
    MissingParameter(&'static str),
    #[error("malformed callback parameters : {0}")]
    MalformedQuery(#[from] MalformedQuery),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("expected the OAuth scheme, found {0:?}")]
    MissingScheme(String),
    #[error("parameter {0:?} is not a key=\"value\" pair")]
    MalformedPair(String),
}
