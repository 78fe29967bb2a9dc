use std::borrow::Cow;
use std::sync::Arc;

use http::Request;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::signer::{OAuthParameters, Signer};
use crate::token_reader::{TokenReader, TokenResponse};
use crate::transport::{context_sender, Context, HttpRequest, RequestSender, SenderResolver};
use crate::{Result, Secrets, SignError, OAUTH_TOKEN_KEY};

/// The provider's request token, authorization and access token URLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
    /// Temporary Credential Request URI
    pub request_token_url: String,
    /// Resource Owner Authorization URI
    pub authorize_url: String,
    /// Token Request URI
    pub access_token_url: String,
}

impl Endpoint {
    pub fn new<A, B, C>(request_token_url: A, authorize_url: B, access_token_url: C) -> Self
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
    {
        Endpoint {
            request_token_url: request_token_url.into(),
            authorize_url: authorize_url.into(),
            access_token_url: access_token_url.into(),
        }
    }
}

/// Consumer credentials, callback and endpoints of a three-legged OAuth 1.0
/// flow (RFC 5849 section 2).
///
/// Each step returns what the next one needs:
///
/// 1. [`Config::request_token`] obtains temporary credentials,
/// 2. [`Config::authorization_url`] sends the resource owner to the provider,
/// 3. [`Config::access_token`] trades the verifier for token credentials,
///
/// after which [`Config::client`] signs resource requests with them.
#[derive(Clone, Deserialize)]
pub struct Config {
    consumer_key: String,
    consumer_secret: String,
    #[serde(default)]
    callback_url: String,
    endpoint: Endpoint,
    #[serde(skip)]
    context: Context,
    #[serde(skip, default = "default_resolver")]
    resolver: SenderResolver,
}

fn default_resolver() -> SenderResolver {
    context_sender
}

impl Config {
    pub fn new<K, S>(consumer_key: K, consumer_secret: S, endpoint: Endpoint) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Config {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback_url: String::new(),
            endpoint,
            context: Context::new(),
            resolver: default_resolver(),
        }
    }

    /// set the callback URL sent as oauth_callback
    pub fn callback_url<T>(self, callback_url: T) -> Self
    where
        T: Into<String>,
    {
        Config {
            callback_url: callback_url.into(),
            ..self
        }
    }

    /// set the context the transport is resolved from
    pub fn context(self, context: Context) -> Self {
        Config { context, ..self }
    }

    /// set the function choosing the transport for the context
    pub fn resolver(self, resolver: SenderResolver) -> Self {
        Config { resolver, ..self }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn sender(&self) -> Arc<dyn RequestSender> {
        (self.resolver)(&self.context)
    }

    fn secrets(&self) -> Secrets<'_, ()> {
        Secrets::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
    }

    /// Obtain temporary credentials (RFC 5849 section 2.1).
    ///
    /// POSTs to the request token URL with `oauth_callback` in the
    /// `Authorization` header and requires the provider to confirm the
    /// callback.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, a status other than 200/201, a malformed
    /// body, a missing token or secret, or an unconfirmed callback.
    pub async fn request_token(&self) -> Result<TokenResponse> {
        let url = &self.endpoint.request_token_url;
        let request = empty_post(url)?;
        let signer = Signer::with_sender(self.secrets(), self.sender())
            .parameters(OAuthParameters::new().callback(self.callback_url.as_str()));

        debug!(%url, "requesting temporary credentials");
        let response = signer.send(request).await?;
        let token = response.parse_temporary_credentials().map_err(|err| {
            warn!(%url, status = %response.status(), %err, "temporary credentials rejected");
            err
        })?;
        debug!(%url, "obtained temporary credentials");
        Ok(token)
    }

    /// The authorization page URL for `request_token` (RFC 5849 section 2.2).
    ///
    /// # Errors
    ///
    /// Fails only when the configured authorization URL is unparsable.
    pub fn authorization_url(&self, request_token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint.authorize_url)?;
        url.query_pairs_mut().append_pair(OAUTH_TOKEN_KEY, request_token);
        Ok(url)
    }

    /// Exchange the temporary credentials and verifier for token
    /// credentials (RFC 5849 section 2.3).
    ///
    /// # Errors
    ///
    /// Fails on transport errors, a status other than 200/201, a malformed
    /// body, or a missing token or secret.
    pub async fn access_token(
        &self,
        request_token: &str,
        request_secret: &str,
        verifier: &str,
    ) -> Result<TokenResponse> {
        let url = &self.endpoint.access_token_url;
        let request = empty_post(url)?;
        let signer = Signer::with_sender(
            self.secrets().token(request_token, request_secret),
            self.sender(),
        )
        .parameters(OAuthParameters::new().verifier(verifier));

        debug!(%url, "requesting token credentials");
        let response = signer.send(request).await?;
        let token = response.parse_oauth_token().map_err(|err| {
            warn!(%url, status = %response.status(), %err, "token credentials rejected");
            err
        })?;
        debug!(%url, "obtained token credentials");
        Ok(token)
    }

    /// A signer for resource requests made with the token credentials,
    /// sending through the transport resolved from the context.
    pub fn client<T, S>(
        &self,
        access_token: T,
        access_secret: S,
    ) -> Signer<'static, Secrets<'static, Cow<'static, str>>, Arc<dyn RequestSender>>
    where
        T: Into<String>,
        S: Into<String>,
    {
        let secrets = Secrets::new(self.consumer_key.clone(), self.consumer_secret.clone())
            .token(access_token.into(), access_secret.into());
        Signer::with_sender(secrets, self.sender())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("endpoint", &self.endpoint)
            .field("context", &self.context)
            .finish()
    }
}

fn empty_post(url: &str) -> std::result::Result<HttpRequest, SignError> {
    Request::post(url)
        .body(Vec::new())
        .map_err(|_| SignError::InvalidUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::header::parse_header;
    use crate::parameters::Parameters;
    use crate::signature::{base_string, sign};
    use crate::transport::stub::StubSender;
    use crate::{Error, TokenReaderError};

    fn twitter_endpoint() -> Endpoint {
        Endpoint::new(
            "https://api.twitter.com/oauth/request_token",
            "https://api.twitter.com/oauth/authorize",
            "https://api.twitter.com/oauth/access_token",
        )
    }

    fn config_with(stub: &Arc<StubSender>) -> Config {
        let sender: Arc<dyn RequestSender> = stub.clone();
        Config::new("consumer_key", "consumer_secret", twitter_endpoint())
            .callback_url("http://localhost/callback")
            .context(Context::new().with_http_client(sender))
    }

    #[tokio::test]
    async fn request_token_success() {
        let stub = Arc::new(StubSender::new(
            200,
            "oauth_token=request_token&oauth_token_secret=request_secret&oauth_callback_confirmed=true",
        ));
        let token = config_with(&stub).request_token().await.unwrap();
        assert_eq!(token.oauth_token, "request_token");
        assert_eq!(token.oauth_token_secret, "request_secret");

        let received = stub.received();
        assert_eq!(received.len(), 1);
        let (method, uri, auth) = &received[0];
        assert_eq!(*method, Method::POST);
        assert_eq!(uri, "https://api.twitter.com/oauth/request_token");
        let params = parse_header(auth.as_deref().unwrap()).unwrap();
        assert_eq!(params.get("oauth_callback"), Some("http://localhost/callback"));
        assert_eq!(params.get("oauth_consumer_key"), Some("consumer_key"));
        assert!(params.contains_key("oauth_signature"));
        assert!(!params.contains_key("oauth_token"));
    }

    #[tokio::test]
    async fn request_token_callback_not_confirmed() {
        let stub = Arc::new(StubSender::new(
            200,
            "oauth_token=request_token&oauth_token_secret=request_secret",
        ));
        let err = config_with(&stub).request_token().await.unwrap_err();
        assert!(matches!(
            err,
            Error::TokenReader(TokenReaderError::CallbackNotConfirmed)
        ));
    }

    #[tokio::test]
    async fn request_token_unexpected_status() {
        let stub = Arc::new(StubSender::new(401, "Failed to validate oauth signature"));
        let err = config_with(&stub).request_token().await.unwrap_err();
        assert!(matches!(
            err,
            Error::TokenReader(TokenReaderError::UnexpectedStatus(401))
        ));
    }

    #[tokio::test]
    async fn request_token_missing_secret() {
        let stub = Arc::new(StubSender::new(
            201,
            "oauth_token=request_token&oauth_callback_confirmed=true",
        ));
        let err = config_with(&stub).request_token().await.unwrap_err();
        assert!(matches!(
            err,
            Error::TokenReader(TokenReaderError::MissingCredentials("oauth_token_secret"))
        ));
    }

    #[tokio::test]
    async fn access_token_success() {
        let stub = Arc::new(StubSender::new(
            200,
            "oauth_token=access_token&oauth_token_secret=access_secret&screen_name=twitterapi",
        ));
        let token = config_with(&stub)
            .access_token("request_token", "request_secret", "verifier")
            .await
            .unwrap();
        assert_eq!(token.oauth_token, "access_token");
        assert_eq!(token.oauth_token_secret, "access_secret");
        assert_eq!(token.remain.get("screen_name").unwrap(), "twitterapi");

        let received = stub.received();
        let (method, uri, auth) = &received[0];
        assert_eq!(*method, Method::POST);
        assert_eq!(uri, "https://api.twitter.com/oauth/access_token");
        let params = parse_header(auth.as_deref().unwrap()).unwrap();
        assert_eq!(params.get("oauth_token"), Some("request_token"));
        assert_eq!(params.get("oauth_verifier"), Some("verifier"));
        assert!(!params.contains_key("oauth_callback"));
    }

    #[tokio::test]
    async fn access_token_keyed_with_request_secret() {
        let stub = Arc::new(StubSender::new(
            200,
            "oauth_token=access_token&oauth_token_secret=access_secret",
        ));
        config_with(&stub)
            .access_token("request_token", "request_secret", "verifier")
            .await
            .unwrap();

        let received = stub.received();
        let (method, uri, auth) = &received[0];
        let sent = parse_header(auth.as_deref().unwrap()).unwrap();
        let signed: Parameters = sent
            .iter()
            .filter(|(k, _)| *k != "oauth_signature")
            .collect();
        let base = base_string(method, &Url::parse(uri).unwrap(), &signed);

        let expected = sign("consumer_secret", "request_secret", &base).unwrap();
        assert_eq!(sent.get("oauth_signature"), Some(expected.as_str()));
        let unkeyed = sign("consumer_secret", "", &base).unwrap();
        assert_ne!(sent.get("oauth_signature"), Some(unkeyed.as_str()));
    }

    #[tokio::test]
    async fn custom_transport_error_surfaced() {
        struct Unreachable;

        #[async_trait::async_trait]
        impl RequestSender for Unreachable {
            async fn send(&self, _: HttpRequest) -> Result<crate::HttpResponse> {
                Err(Error::transport("connection reset by peer"))
            }
        }

        let err = Config::new("key", "secret", twitter_endpoint())
            .context(Context::new().with_http_client(Arc::new(Unreachable)))
            .request_token()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(
            std::error::Error::source(&err).map(|source| source.to_string()),
            Some("connection reset by peer".to_string())
        );
    }

    #[tokio::test]
    async fn access_token_missing_secret() {
        let stub = Arc::new(StubSender::new(200, "oauth_token=access_token"));
        let err = config_with(&stub)
            .access_token("request_token", "request_secret", "verifier")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TokenReader(TokenReaderError::MissingCredentials("oauth_token_secret"))
        ));
    }

    #[test]
    fn authorization_url_appends_token() {
        let config = Config::new("key", "secret", twitter_endpoint());
        let url = config.authorization_url("NPcudxy0yU5T3tBzho7iCotZ3cnetKwcTIRlX0iwRl0").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twitter.com/oauth/authorize?oauth_token=NPcudxy0yU5T3tBzho7iCotZ3cnetKwcTIRlX0iwRl0"
        );

        let endpoint = Endpoint::new("", "https://example.com/authorize?lang=en", "");
        let url = Config::new("key", "secret", endpoint)
            .authorization_url("a b")
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/authorize?lang=en&oauth_token=a+b");
    }

    #[test]
    fn authorization_url_unparsable() {
        let endpoint = Endpoint::new("", "not a url", "");
        let err = Config::new("key", "secret", endpoint)
            .authorization_url("token")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn client_signs_with_access_token() {
        let stub = Arc::new(StubSender::new(200, "[]"));
        let client = config_with(&stub).client("access_token", "access_secret");
        let request = Request::get("https://api.twitter.com/1.1/statuses/home_timeline.json?count=2")
            .body(Vec::new())
            .unwrap();
        client.send(request).await.unwrap();

        let received = stub.received();
        let params = parse_header(received[0].2.as_deref().unwrap()).unwrap();
        assert_eq!(params.get("oauth_token"), Some("access_token"));
        assert!(!params.contains_key("count"));
    }

    #[test]
    fn default_transport_reused_across_steps() {
        let config = Config::new("key", "secret", twitter_endpoint());
        let first = config.sender();
        let second = config.clone().sender();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn custom_resolver() {
        fn failing(_: &Context) -> Arc<dyn RequestSender> {
            Arc::new(StubSender::new(503, ""))
        }
        let err = Config::new("key", "secret", twitter_endpoint())
            .resolver(failing)
            .request_token()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TokenReader(TokenReaderError::UnexpectedStatus(503))
        ));
    }

    #[test]
    fn deserialize_config() {
        let config: Config = serde_json::from_str(
            r#"{
                "consumer_key": "key",
                "consumer_secret": "secret",
                "callback_url": "oob",
                "endpoint": {
                    "request_token_url": "https://api.twitter.com/oauth/request_token",
                    "authorize_url": "https://api.twitter.com/oauth/authorize",
                    "access_token_url": "https://api.twitter.com/oauth/access_token"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.endpoint(), &twitter_endpoint());
        assert_eq!(config.callback_url, "oob");
        assert!(config.context.http_client().is_none());
        let printed = format!("{:?}", config);
        assert!(!printed.contains("\"secret\""));
    }
}
