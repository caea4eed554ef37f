//! Credential acquisition flows.
//!
//! Three producers of a credential pair, all converging on
//! [`Session::login`]: store hydration (handled by the session itself), the
//! one-time emailed link, and the delegated identity-provider flow. The two
//! interactive flows share one status machine: `Verifying` is entered once
//! and exited once, `Success` carries the post-login redirect, `Error` is
//! terminal with no automatic retry.

use crate::auth::client::AuthClient;
use crate::auth::error::Error;
use crate::auth::guard;
use crate::auth::session::{Navigator, Session};
use secrecy::SecretString;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use url::Url;

/// Delay before the post-success navigation so a confirmation can be read.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Acquisition status shared by the one-time-link and provider flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    Verifying,
    Success { redirect: String },
    Error(String),
}

/// One-time emailed-link verification.
///
/// Exactly one verification call is made per flow value: a duplicate
/// invocation (re-render, double mount) settles on the first outcome without
/// touching the network, so a single-use token is never replayed.
#[derive(Debug, Default)]
pub struct MagicLinkFlow {
    outcome: OnceCell<FlowStatus>,
}

impl MagicLinkFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status; `Verifying` until the one verification call settles.
    #[must_use]
    pub fn status(&self) -> FlowStatus {
        self.outcome.get().cloned().unwrap_or(FlowStatus::Verifying)
    }

    /// Verify the emailed token and log in.
    ///
    /// Success redirects to profile setup when the backend reports an
    /// incomplete profile, else to the stored post-login target, else to the
    /// application root. Failure is terminal.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str, session: &Session, auth: &AuthClient) -> FlowStatus {
        self.outcome
            .get_or_init(|| async {
                match auth.verify_magic_link(token).await {
                    Ok(verification) => {
                        session.login(
                            SecretString::from(verification.access),
                            SecretString::from(verification.refresh),
                        );
                        let redirect = if verification.profile_complete {
                            session
                                .take_pending_redirect()
                                .unwrap_or_else(|| guard::ROOT_PATH.to_string())
                        } else {
                            guard::SETUP_PATH.to_string()
                        };
                        FlowStatus::Success { redirect }
                    }
                    Err(err) => FlowStatus::Error(err.to_string()),
                }
            })
            .await
            .clone()
    }

    /// Navigate to the success redirect after [`SUCCESS_REDIRECT_DELAY`].
    /// Does nothing unless the flow settled on `Success`.
    pub async fn complete(&self, navigator: &dyn Navigator) {
        if let Some(FlowStatus::Success { redirect }) = self.outcome.get() {
            tokio::time::sleep(SUCCESS_REDIRECT_DELAY).await;
            navigator.navigate(redirect);
        }
    }
}

/// Start the delegated identity-provider flow: fetch the authorization URL
/// and PKCE verifier, persist the verifier and the desired post-login
/// redirect, then send the browsing context to the provider. A pending
/// force-fresh-login flag is consumed into a `prompt=login` parameter so the
/// provider cannot silently reuse its previous session.
///
/// # Errors
/// Returns an error if the backend cannot produce an authorization URL.
#[instrument(skip_all)]
pub async fn provider_login_start(
    session: &Session,
    auth: &AuthClient,
    navigator: &dyn Navigator,
    redirect_after_login: Option<&str>,
) -> Result<(), Error> {
    let start = auth.provider_login_start().await?;
    session.set_pkce_verifier(&start.code_verifier);
    if let Some(target) = redirect_after_login {
        session.set_pending_redirect(target);
    }

    let mut target = start.auth_url;
    if session.take_force_fresh_login() {
        if let Ok(mut url) = Url::parse(&target) {
            url.query_pairs_mut().append_pair("prompt", "login");
            target = url.to_string();
        }
        debug!("requesting a fresh provider login");
    }

    navigator.navigate(&target);
    Ok(())
}

/// Handle the provider's return: exchange the authorization response through
/// the backend using the stored verifier, log in, keep the provider ID token
/// for logout, and resolve the stored redirect target.
#[instrument(skip_all)]
pub async fn provider_callback(
    session: &Session,
    auth: &AuthClient,
    authorization_response: &str,
) -> FlowStatus {
    // Consume the verifier up front; it is single-use either way.
    let Some(verifier) = session.take_pkce_verifier() else {
        return FlowStatus::Error(
            "this login attempt has no stored verifier; start the login again".to_string(),
        );
    };

    match auth
        .provider_callback(authorization_response, &verifier)
        .await
    {
        Ok(exchange) => {
            session.login(
                SecretString::from(exchange.access),
                SecretString::from(exchange.refresh),
            );
            if let Some(id_token) = exchange.id_token {
                session.set_provider_id_token(&id_token);
            }
            let redirect = session
                .take_pending_redirect()
                .unwrap_or_else(|| guard::ROOT_PATH.to_string());
            FlowStatus::Success { redirect }
        }
        Err(err) => FlowStatus::Error(err.to_string()),
    }
}
