//! Authenticated JSON transport.
//!
//! Every outgoing request goes through the renewal interceptor: a missing
//! token means the request proceeds unauthenticated, a live token is attached
//! as a bearer credential, and an expired token triggers the single-flight
//! renewal with concurrent callers queued behind it. Renewal failure is
//! terminal for the session: credentials are cleared, queued callers are
//! rejected with the same failure, and the browsing context is sent to the
//! login entry point.

use crate::auth::client::{handle_json, AuthClient};
use crate::auth::error::Error;
use crate::auth::guard;
use crate::auth::refresh::{Entry, RefreshGate};
use crate::auth::session::{Navigator, Session};
use crate::auth::token;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};

/// JSON client for the clubdesk API with credential renewal built in.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthClient,
    session: Session,
    gate: RefreshGate,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let auth = AuthClient::new(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .map_err(|err| Error::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            auth,
            session,
            gate: RefreshGate::new(),
            navigator,
        })
    }

    /// The unauthenticated `/auth/*` endpoint client sharing this base URL.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON resource through the interceptor.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx statuses, undecodable bodies, or a
    /// terminal renewal failure.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path);
        let mut request = self.http.get(&url);
        if let Some(access) = self.bearer().await? {
            request = request.bearer_auth(access.expose_secret());
        }

        let span = info_span!("api.request", http.method = "GET", url = %url);
        let response = request.send().instrument(span).await?;
        handle_json(response).await
    }

    /// POST a JSON body through the interceptor and parse a JSON response.
    ///
    /// # Errors
    /// Same failure modes as [`ApiClient::get_json`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.endpoint(path);
        let mut request = self.http.post(&url).json(body);
        if let Some(access) = self.bearer().await? {
            request = request.bearer_auth(access.expose_secret());
        }

        let span = info_span!("api.request", http.method = "POST", url = %url);
        let response = request.send().instrument(span).await?;
        handle_json(response).await
    }

    /// The interceptor: produce the access token to attach, renewing first if
    /// it is expired. `Ok(None)` means proceed unauthenticated.
    async fn bearer(&self) -> Result<Option<SecretString>, Error> {
        let Some(access) = self.session.access_token() else {
            return Ok(None);
        };
        if !token::is_expired(access.expose_secret()) {
            return Ok(Some(access));
        }

        match self.gate.enter() {
            Entry::Waiter(rx) => match rx.await {
                Ok(outcome) => outcome.map(Some),
                Err(_) => Err(Error::RenewalFailed(
                    "renewal abandoned before settling".to_string(),
                )),
            },
            Entry::Leader => {
                // Another caller may have settled a renewal between our
                // expiry check and winning the gate; their token is current.
                if let Some(access) = self.session.access_token() {
                    if !token::is_expired(access.expose_secret()) {
                        self.gate.settle(&Ok(access.clone()));
                        return Ok(Some(access));
                    }
                }

                let outcome = self.renew().await;
                if outcome.is_err() {
                    self.session.clear_local();
                }
                self.gate.settle(&outcome);
                if outcome.is_err() {
                    warn!("credential renewal failed; returning to login");
                    self.navigator.navigate(guard::LOGIN_PATH);
                }
                outcome.map(Some)
            }
        }
    }

    /// One renewal call. Persists the new pair on success; never retries, a
    /// rejected renewal credential fails identically on retry.
    async fn renew(&self) -> Result<SecretString, Error> {
        let Some(renewal) = self.session.renewal_token() else {
            return Err(Error::RenewalFailed("no renewal token".to_string()));
        };

        match self.auth.refresh_token(&renewal).await {
            Ok(pair) => {
                let access = SecretString::from(pair.access);
                self.session
                    .login(access.clone(), SecretString::from(pair.refresh));
                Ok(access)
            }
            Err(err) => Err(Error::RenewalFailed(err.to_string())),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
