use reqwest::Client as ReqwestClient;

use crate::{OAuthParameters, SecretsProvider, Signer};

/// Turns a `reqwest::Client` into a signing [`Signer`].
pub trait OAuthClientProvider {
    fn oauth1<'a, T>(self, secrets: T) -> Signer<'a, T, Self>
    where
        Self: Sized,
        T: SecretsProvider,
    {
        self.oauth1_with_params(secrets, OAuthParameters::new())
    }

    fn oauth1_with_params<'a, T>(
        self,
        secrets: T,
        params: OAuthParameters<'a>,
    ) -> Signer<'a, T, Self>
    where
        Self: Sized,
        T: SecretsProvider;
}

impl OAuthClientProvider for ReqwestClient {
    fn oauth1_with_params<'a, T>(
        self,
        secrets: T,
        parameters: OAuthParameters<'a>,
    ) -> Signer<'a, T, Self>
    where
        Self: Sized,
        T: SecretsProvider,
    {
        Signer::with_sender(secrets, self).parameters(parameters)
    }
}
