use std::collections::HashMap;

use http::{Response, StatusCode};
use serde::Deserialize;

use crate::encoding::parse_form;
use crate::{TokenReaderError, TokenReaderResult};

const OAUTH_TOKEN_KEY: &str = "oauth_token";

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

const OAUTH_CALLBACK_CONFIRMED_KEY: &str = "oauth_callback_confirmed";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

impl TokenResponse {
    /// Whether the provider answered `oauth_callback_confirmed=true`.
    pub fn callback_confirmed(&self) -> bool {
        self.remain
            .get(OAUTH_CALLBACK_CONFIRMED_KEY)
            .map(|v| v == "true")
            .unwrap_or(false)
    }
}

/// Add parse_oauth_token feature to http::Response.
// this trait is sealed
pub trait TokenReader: private::Sealed {
    /// Read token credentials from a 200/201 form-encoded response.
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse>;

    /// Read temporary credentials, which additionally require the provider
    /// to have confirmed the callback.
    fn parse_temporary_credentials(&self) -> TokenReaderResult<TokenResponse> {
        let token = self.parse_oauth_token()?;
        if token.callback_confirmed() {
            Ok(token)
        } else {
            Err(TokenReaderError::CallbackNotConfirmed)
        }
    }
}

impl<B> TokenReader for Response<B>
where
    B: AsRef<[u8]>,
{
    fn parse_oauth_token(&self) -> TokenReaderResult<TokenResponse> {
        let status = self.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(TokenReaderError::UnexpectedStatus(status.as_u16()));
        }
        read_oauth_token(self.body().as_ref())
    }
}

fn read_oauth_token(body: &[u8]) -> TokenReaderResult<TokenResponse> {
    let mut destructured = HashMap::new();
    // first occurrence wins
    for (key, value) in parse_form(body)? {
        destructured.entry(key).or_insert(value);
    }
    let oauth_token = destructured
        .remove(OAUTH_TOKEN_KEY)
        .filter(|t| !t.is_empty());
    let oauth_token_secret = destructured
        .remove(OAUTH_TOKEN_SECRET_KEY)
        .filter(|s| !s.is_empty());
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::MissingCredentials(OAUTH_TOKEN_KEY)),
        (_, _) => Err(TokenReaderError::MissingCredentials(
            OAUTH_TOKEN_SECRET_KEY,
        )),
    }
}

mod private {
    use http::Response;

    pub trait Sealed {}
    impl<B> Sealed for Response<B> where B: AsRef<[u8]> {}
}
