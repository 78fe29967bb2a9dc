/*!
oauth1-flow: OAuth 1.0 (RFC 5849) for HTTP clients.

# Overview

This library signs HTTP requests with the `HMAC-SHA1` signature method and
drives the three-legged credential flow (temporary credentials, resource
owner authorization, token credentials). The HTTP stack is injected through
the [`RequestSender`] trait; a [`reqwest`](https://crates.io/crates/reqwest)
client is used when nothing else is configured.

# How to use

## Acquiring OAuth token & secret

```rust,no_run
use oauth1_flow::{Config, Endpoint, RequestSender};

# async fn run() -> oauth1_flow::Result<()> {
let endpoint = Endpoint::new(
    "https://api.twitter.com/oauth/request_token",
    "https://api.twitter.com/oauth/authorize",
    "https://api.twitter.com/oauth/access_token",
);
let config = Config::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]", endpoint)
    .callback_url("https://app.example.com/callback");

// step 1: acquire request token & token secret
let request_token = config.request_token().await?;

// step 2: send the user to the provider
let url = config.authorization_url(&request_token.oauth_token)?;
println!("please access to: {}", url);

// the provider redirects back to the callback,
// see `parse_authorization_callback`
let verifier = "[VERIFIER]";

// step 3: acquire access token
let access_token = config
    .access_token(
        &request_token.oauth_token,
        &request_token.oauth_token_secret,
        verifier,
    )
    .await?;

// every request sent through the client is signed
let client = config.client(access_token.oauth_token, access_token.oauth_token_secret);
let request = http::Request::get("https://api.twitter.com/1.1/account/verify_credentials.json")
    .body(Vec::new())
    .unwrap();
let response = client.send(request).await?;
println!("status: {}", response.status());
# Ok(())
# }
```

## Signing with an existing reqwest client

```rust,no_run
use oauth1_flow::{OAuthClientProvider, RequestSender, Secrets};

# async fn run() -> oauth1_flow::Result<()> {
let secrets = Secrets::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let client = reqwest::Client::new().oauth1(secrets);
let request = http::Request::post("https://api.twitter.com/1.1/statuses/update.json")
    .header("content-type", "application/x-www-form-urlencoded")
    .body(b"status=Hello%2C%20Twitter%21".to_vec())
    .unwrap();
client.send(request).await?;
# Ok(())
# }
```
*/
mod callback;
mod client;
mod config;
mod encoding;
mod error;
mod header;
mod parameters;
mod secrets;
mod signature;
mod signer;
mod token_reader;
mod transport;

// exposed to external program
pub use callback::{parse_authorization_callback, AuthorizationCallback};
pub use client::OAuthClientProvider;
pub use config::{Config, Endpoint};
pub use encoding::percent_encode;
pub use error::{
    BoxError, CallbackError, CallbackResult, Error, HeaderError, HeaderResult, MalformedQuery,
    Result, SignError, SignResult, TokenReaderError, TokenReaderResult,
};
pub use header::{format_header, format_header_with_realm, parse_header};
pub use parameters::Parameters;
pub use secrets::{Secrets, SecretsProvider};
pub use signature::{base_string, normalize_url, sign, SigningContext};
pub use signer::{OAuthParameters, Signer};
pub use token_reader::{TokenReader, TokenResponse};
pub use transport::{
    context_sender, Context, HttpRequest, HttpResponse, RequestSender, SenderResolver,
};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
pub(crate) const SIGNATURE_METHOD_HMAC_SHA1: &str = "HMAC-SHA1";
pub(crate) const VERSION_1_0: &str = "1.0";
