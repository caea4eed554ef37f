//! Client wrappers for the clubdesk auth API endpoints. These helpers
//! centralize headers and error handling so flow and session code never
//! builds requests by hand.

use crate::auth::error::{sanitize_body, Error};
use crate::auth::types::{
    MagicLinkVerification, ProviderCallbackExchange, ProviderCallbackRequest, ProviderLoginStart,
    ProviderLogoutRequest, ProviderLogoutResponse, TokenPair,
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{info_span, instrument, Instrument};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the `/auth/*` endpoints.
///
/// Calls here never go through the renewal interceptor: the renewal and
/// termination endpoints authenticate with the renewal token itself, and the
/// acquisition endpoints are unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| Error::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a URL from the configured base URL and the provided path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange the renewal token for a fresh credential pair.
    ///
    /// # Errors
    /// Any non-2xx response is an error; the caller treats it as terminal for
    /// the session.
    #[instrument(skip(self, renewal))]
    pub async fn refresh_token(&self, renewal: &SecretString) -> Result<TokenPair, Error> {
        let url = self.endpoint("/auth/refreshToken");
        let span = info_span!("auth.refresh_token", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", renewal.expose_secret())
            .send()
            .instrument(span)
            .await?;

        handle_json(response).await
    }

    /// Verify a one-time emailed login token.
    ///
    /// # Errors
    /// Non-2xx responses surface the body as plaintext error detail.
    #[instrument(skip(self, token))]
    pub async fn verify_magic_link(&self, token: &str) -> Result<MagicLinkVerification, Error> {
        let url = self.endpoint("/auth/verifyMagicLink");
        let span = info_span!("auth.verify_magic_link", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .instrument(span)
            .await?;

        handle_json(response).await
    }

    /// Ask the backend for the provider authorization URL and PKCE verifier.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is not the
    /// expected JSON.
    #[instrument(skip(self))]
    pub async fn provider_login_start(&self) -> Result<ProviderLoginStart, Error> {
        let url = self.endpoint("/auth/provider/login");
        let span = info_span!("auth.provider_login_start", http.method = "GET", url = %url);
        let response = self.client.get(&url).send().instrument(span).await?;

        handle_json(response).await
    }

    /// Exchange the provider authorization response for a credential pair.
    ///
    /// # Errors
    /// Returns an error if the exchange is rejected or the response is not
    /// the expected JSON.
    #[instrument(skip(self, authorization_response, code_verifier))]
    pub async fn provider_callback(
        &self,
        authorization_response: &str,
        code_verifier: &str,
    ) -> Result<ProviderCallbackExchange, Error> {
        let url = self.endpoint("/auth/provider/callback");
        let span = info_span!("auth.provider_callback", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&ProviderCallbackRequest {
                response: authorization_response,
                code_verifier,
            })
            .send()
            .instrument(span)
            .await?;

        handle_json(response).await
    }

    /// Plain server-side session termination.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status; callers treat
    /// this as best-effort.
    #[instrument(skip(self, renewal))]
    pub async fn logout(&self, renewal: &SecretString) -> Result<(), Error> {
        let url = self.endpoint("/auth/logout");
        let span = info_span!("auth.logout", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", renewal.expose_secret())
            .send()
            .instrument(span)
            .await?;

        handle_empty(response).await
    }

    /// Request the provider logout URL, terminating the server-side session.
    ///
    /// # Errors
    /// Returns an error if the backend cannot produce a logout URL; the
    /// caller falls back to plain termination.
    #[instrument(skip(self, renewal, id_token))]
    pub async fn provider_logout(
        &self,
        renewal: &SecretString,
        id_token: Option<&str>,
        post_logout_redirect_uri: &str,
    ) -> Result<String, Error> {
        let url = self.endpoint("/auth/provider/logout");
        let span = info_span!("auth.provider_logout", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", renewal.expose_secret())
            .json(&ProviderLogoutRequest {
                post_logout_redirect_uri,
                id_token,
            })
            .send()
            .instrument(span)
            .await?;

        let body: ProviderLogoutResponse = handle_json(response).await?;
        Ok(body.logout_url)
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
pub(crate) async fn handle_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Parse(format!("failed to decode response: {err}")))
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Http {
            status,
            message: sanitize_body(body),
        })
    }
}

/// Handles empty responses and returns sanitized HTTP errors when needed.
pub(crate) async fn handle_empty(response: reqwest::Response) -> Result<(), Error> {
    if response.status().is_success() {
        Ok(())
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Http {
            status,
            message: sanitize_body(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        let client = AuthClient::new("https://api.clubdesk.dev/").expect("client");
        assert_eq!(
            client.endpoint("/auth/refreshToken"),
            "https://api.clubdesk.dev/auth/refreshToken"
        );
        assert_eq!(
            client.endpoint("auth/logout"),
            "https://api.clubdesk.dev/auth/logout"
        );
    }
}
