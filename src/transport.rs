use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

use crate::Result;

pub type HttpRequest = http::Request<Vec<u8>>;
pub type HttpResponse = http::Response<Vec<u8>>;

/// Sends an HTTP request and returns the provider's response.
///
/// This is the single capability the crate needs from an HTTP stack. It is
/// used for the credential exchanges and as the delegate underneath a
/// [`Signer`](crate::Signer). Timeouts and cancellation belong to the
/// implementation.
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl RequestSender for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = reqwest::Request::try_from(request)?;
        let response = self.execute(request).await?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let mut converted = HttpResponse::new(body.to_vec());
        *converted.status_mut() = status;
        *converted.version_mut() = version;
        *converted.headers_mut() = headers;
        Ok(converted)
    }
}

#[async_trait]
impl<T> RequestSender for Arc<T>
where
    T: RequestSender + ?Sized,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}

/// Chooses the transport for a [`Context`].
pub type SenderResolver = fn(&Context) -> Arc<dyn RequestSender>;

/// Explicit carrier for the HTTP client the credential flow should use.
///
/// Without an injected client, the default `reqwest::Client` is created on
/// first use and shared by every clone of the context.
#[derive(Clone, Default)]
pub struct Context {
    http_client: Option<Arc<dyn RequestSender>>,
    default_client: Arc<OnceLock<Arc<dyn RequestSender>>>,
}

impl Context {
    pub fn new() -> Self {
        Default::default()
    }

    /// Use `sender` for every request issued under this context.
    pub fn with_http_client(self, sender: Arc<dyn RequestSender>) -> Self {
        Context {
            http_client: Some(sender),
            ..self
        }
    }

    pub fn http_client(&self) -> Option<&Arc<dyn RequestSender>> {
        self.http_client.as_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

/// Default [`SenderResolver`]: the context's client if one was injected,
/// the context's shared `reqwest::Client` otherwise.
pub fn context_sender(ctx: &Context) -> Arc<dyn RequestSender> {
    match ctx.http_client() {
        Some(sender) => Arc::clone(sender),
        None => Arc::clone(
            ctx.default_client
                .get_or_init(|| Arc::new(ReqwestClient::new())),
        ),
    }
}
