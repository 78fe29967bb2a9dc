use std::borrow::Cow;

use async_trait::async_trait;
use http::header::{HeaderValue, AUTHORIZATION};
use http::Request;
use reqwest::Client as ReqwestClient;
use tracing::{debug, trace};
use url::Url;

use crate::header::format_header_with_realm;
use crate::parameters::Parameters;
use crate::signature::{base_string, current_timestamp, generate_nonce, sign, SigningContext};
use crate::transport::{HttpRequest, HttpResponse, RequestSender};
use crate::{
    Result, SecretsProvider, SignError, SignResult, OAUTH_CALLBACK_KEY, OAUTH_SIGNATURE_KEY,
    OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY,
};

/// Signs outgoing requests and hands them to the wrapped sender.
///
/// `Signer` is itself a [`RequestSender`], so it can stand wherever a plain
/// transport is expected and every request through it gets an
/// `Authorization` header.
#[derive(Clone)]
pub struct Signer<'a, TSecretsProvider, TSender = ReqwestClient>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: TSecretsProvider,
    parameters: OAuthParameters<'a>,
    inner: TSender,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider, ReqwestClient>
where
    TSecretsProvider: SecretsProvider,
{
    /// Sign with `secrets` and send through a default `reqwest::Client`.
    pub fn new(secrets: TSecretsProvider) -> Self {
        Signer::with_sender(secrets, ReqwestClient::new())
    }
}

impl<'a, TSecretsProvider, TSender> Signer<'a, TSecretsProvider, TSender>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn with_sender(secrets: TSecretsProvider, inner: TSender) -> Self {
        Signer {
            secrets,
            parameters: OAuthParameters::new(),
            inner,
        }
    }

    /// Replace the per-request OAuth parameters.
    pub fn parameters(self, parameters: OAuthParameters<'a>) -> Self {
        Signer { parameters, ..self }
    }

    /// The sender signed requests are delegated to.
    pub fn inner(&self) -> &TSender {
        &self.inner
    }

    /// Compute the `Authorization` header value for `request`.
    ///
    /// # Errors
    ///
    /// Fails when the request URI is not absolute, when its query or form
    /// body is malformed, or when the clock is unusable.
    pub fn authorization<B>(&self, request: &Request<B>) -> SignResult<String>
    where
        B: AsRef<[u8]>,
    {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();

        let url = request_url(request)?;
        let mut params = Parameters::from_request(request, consumer_key)?;
        self.parameters.apply(&mut params, token);
        self.parameters.signing_context()?.apply(&mut params);

        let base = base_string(request.method(), &url, &params);
        trace!(%base, "signature base string");
        let signature = sign(consumer_secret, token_secret.unwrap_or_default(), &base)?;
        params.add(OAUTH_SIGNATURE_KEY, signature);

        Ok(format_header_with_realm(
            self.parameters.realm.as_deref(),
            &params.protocol_parameters(),
        ))
    }

    /// A signed copy of `request`. The caller's request is left untouched;
    /// extensions are not carried over to the copy.
    ///
    /// # Errors
    ///
    /// See [`Signer::authorization`].
    pub fn sign_request<B>(&self, request: &Request<B>) -> SignResult<Request<B>>
    where
        B: AsRef<[u8]> + Clone,
    {
        let authorization = self.authorization(request)?;
        let value = HeaderValue::from_str(&authorization).map_err(|_| SignError::InvalidHeader)?;

        let mut signed = clone_request(request);
        signed.headers_mut().insert(AUTHORIZATION, value);
        debug!(
            method = %request.method(),
            uri = %request.uri(),
            "signed request"
        );
        Ok(signed)
    }
}

#[async_trait]
impl<'a, TSecretsProvider, TSender> RequestSender for Signer<'a, TSecretsProvider, TSender>
where
    TSecretsProvider: SecretsProvider + Send + Sync,
    TSender: RequestSender,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let signed = self.sign_request(&request)?;
        self.inner.send(signed).await
    }
}

fn request_url<B>(request: &Request<B>) -> SignResult<Url> {
    let uri = request.uri().to_string();
    Url::parse(&uri).map_err(|_| SignError::InvalidUrl(uri))
}

// headers are deep-copied so the caller's map never sees the new header
fn clone_request<B: Clone>(request: &Request<B>) -> Request<B> {
    let mut cloned = Request::new(request.body().clone());
    *cloned.method_mut() = request.method().clone();
    *cloned.uri_mut() = request.uri().clone();
    *cloned.version_mut() = request.version();
    *cloned.headers_mut() = request.headers().clone();
    cloned
}

/// Protocol parameters that vary by flow step, plus fixed nonce/timestamp
/// for reproducible signatures.
#[derive(Debug, Clone, Default)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the oauth_callback value
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value instead of generating one per request
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value
    ///
    /// # Note
    /// The realm is only rendered into the header; it is not signed.
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value instead of reading the clock
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    fn apply(&self, params: &mut Parameters, token: Option<&str>) {
        if let Some(ref callback) = self.callback {
            params.add(OAUTH_CALLBACK_KEY, &**callback);
        }
        if let Some(token) = token {
            params.add(OAUTH_TOKEN_KEY, token);
        }
        if let Some(ref verifier) = self.verifier {
            params.add(OAUTH_VERIFIER_KEY, &**verifier);
        }
    }

    fn signing_context(&self) -> SignResult<SigningContext> {
        let nonce = match self.nonce {
            Some(ref nonce) => nonce.to_string(),
            None => generate_nonce(),
        };
        let timestamp = match self.timestamp {
            Some(timestamp) => timestamp,
            None => current_timestamp()?,
        };
        Ok(SigningContext::new(nonce, timestamp))
    }
}
