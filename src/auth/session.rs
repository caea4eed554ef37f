//! Auth session state shared across the client.
//!
//! The session holds the credential pair and the authenticated flag, persists
//! credential changes to the [`CredentialStore`], and owns logout
//! orchestration. It is the only writer of the store besides the renewal
//! path, which also goes through [`Session::login`].

use crate::auth::client::AuthClient;
use crate::auth::guard;
use crate::auth::store::{self, CredentialStore};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Browsing-context navigation seam.
///
/// In the original deployment this is `window.location`; the CLI prints the
/// target URL, tests record it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Navigator that goes nowhere, for headless use.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _target: &str) {}
}

struct SessionState {
    access: Option<SecretString>,
    renewal: Option<SecretString>,
    /// Bumped on every credential identity change; observers (profile cache,
    /// guards) re-evaluate when it moves.
    epoch: u64,
}

struct SessionInner {
    state: Mutex<SessionState>,
    store: Arc<dyn CredentialStore>,
    changed: watch::Sender<u64>,
}

/// Shared handle to the session; cheap to clone, lives for the process.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Builds the session from persisted state.
    ///
    /// Authentication is decided on token *presence* only; expiry is checked
    /// lazily by the renewal interceptor on first use, so construction never
    /// performs network I/O.
    #[must_use]
    pub fn from_store(store: Arc<dyn CredentialStore>) -> Self {
        let access = store.get(store::ACCESS_TOKEN).map(SecretString::from);
        let renewal = store.get(store::RENEWAL_TOKEN).map(SecretString::from);
        let (changed, _) = watch::channel(0);

        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionState {
                    access,
                    renewal,
                    epoch: 0,
                }),
                store,
                changed,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().access.is_some()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.state().access.clone()
    }

    #[must_use]
    pub fn renewal_token(&self) -> Option<SecretString> {
        self.state().renewal.clone()
    }

    /// Identity of the current credentials; moves on login/logout/renewal.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    /// Watch credential identity changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }

    /// Set both credentials, mark authenticated, and persist. No network.
    pub fn login(&self, access: SecretString, renewal: SecretString) {
        let epoch = {
            let mut state = self.state();
            self.inner
                .store
                .set(store::ACCESS_TOKEN, access.expose_secret());
            self.inner
                .store
                .set(store::RENEWAL_TOKEN, renewal.expose_secret());
            state.access = Some(access);
            state.renewal = Some(renewal);
            state.epoch += 1;
            state.epoch
        };
        let _ = self.inner.changed.send_replace(epoch);
        debug!("session credentials updated");
    }

    /// Re-read the store in case credentials arrived after construction
    /// (cookie timing on page load). Only upgrades an unauthenticated
    /// session; a live session is never clobbered.
    pub fn rehydrate(&self) {
        let epoch = {
            let mut state = self.state();
            if state.access.is_some() {
                return;
            }
            let Some(access) = self.inner.store.get(store::ACCESS_TOKEN) else {
                return;
            };
            state.access = Some(SecretString::from(access));
            state.renewal = self
                .inner
                .store
                .get(store::RENEWAL_TOKEN)
                .map(SecretString::from);
            state.epoch += 1;
            state.epoch
        };
        let _ = self.inner.changed.send_replace(epoch);
    }

    /// Clear both credentials and all provider auxiliary state, in memory and
    /// in the store. Idempotent; the force-fresh-login flag is left alone so
    /// a provider logout can survive into the next login attempt.
    pub(crate) fn clear_local(&self) {
        let epoch = {
            let mut state = self.state();
            state.access = None;
            state.renewal = None;
            for key in [
                store::ACCESS_TOKEN,
                store::RENEWAL_TOKEN,
                store::PROVIDER_ID_TOKEN,
                store::PKCE_VERIFIER,
                store::PENDING_REDIRECT,
            ] {
                self.inner.store.remove(key);
            }
            state.epoch += 1;
            state.epoch
        };
        let _ = self.inner.changed.send_replace(epoch);
    }

    /// End the session.
    ///
    /// With a renewal token present, a server-side termination call is made
    /// carrying the renewal token as the authorization value. When
    /// `revoke_at_provider` is set and the backend returns a provider logout
    /// URL, the browsing context is sent there only after local state has
    /// been cleared, so a slow or failed navigation cannot leave stale
    /// credentials behind. Local state is cleared exactly once on every
    /// branch, and this method never fails: transport errors are logged and
    /// swallowed.
    #[instrument(skip(self, auth, navigator))]
    pub async fn logout(
        &self,
        auth: &AuthClient,
        navigator: &dyn Navigator,
        revoke_at_provider: bool,
    ) {
        let mut logout_url = None;

        if let Some(renewal) = self.renewal_token() {
            if revoke_at_provider {
                let id_token = self.provider_id_token();
                match auth
                    .provider_logout(&renewal, id_token.as_deref(), guard::LOGIN_PATH)
                    .await
                {
                    Ok(url) => logout_url = Some(url),
                    Err(err) => {
                        warn!("provider logout failed, terminating session directly: {err}");
                        if let Err(err) = auth.logout(&renewal).await {
                            warn!("session termination failed: {err}");
                        }
                    }
                }
            } else if let Err(err) = auth.logout(&renewal).await {
                warn!("session termination failed: {err}");
            }
        }

        self.clear_local();

        if let Some(url) = logout_url {
            // The next login must not silently reuse the provider session.
            self.set_force_fresh_login();
            navigator.navigate(&url);
        }
    }

    // Auxiliary provider state. Stored only for the duration of one login
    // round-trip; `take_*` consumes.

    #[must_use]
    pub fn provider_id_token(&self) -> Option<String> {
        self.inner.store.get(store::PROVIDER_ID_TOKEN)
    }

    pub fn set_provider_id_token(&self, id_token: &str) {
        self.inner.store.set(store::PROVIDER_ID_TOKEN, id_token);
    }

    #[must_use]
    pub fn pending_redirect(&self) -> Option<String> {
        self.inner.store.get(store::PENDING_REDIRECT)
    }

    pub fn set_pending_redirect(&self, target: &str) {
        self.inner.store.set(store::PENDING_REDIRECT, target);
    }

    pub fn take_pending_redirect(&self) -> Option<String> {
        let target = self.inner.store.get(store::PENDING_REDIRECT);
        if target.is_some() {
            self.inner.store.remove(store::PENDING_REDIRECT);
        }
        target
    }

    pub fn set_pkce_verifier(&self, verifier: &str) {
        self.inner.store.set(store::PKCE_VERIFIER, verifier);
    }

    pub fn take_pkce_verifier(&self) -> Option<String> {
        let verifier = self.inner.store.get(store::PKCE_VERIFIER);
        if verifier.is_some() {
            self.inner.store.remove(store::PKCE_VERIFIER);
        }
        verifier
    }

    pub fn set_force_fresh_login(&self) {
        self.inner.store.set(store::FORCE_FRESH_LOGIN, "1");
    }

    pub fn take_force_fresh_login(&self) -> bool {
        let set = self.inner.store.get(store::FORCE_FRESH_LOGIN).is_some();
        if set {
            self.inner.store.remove(store::FORCE_FRESH_LOGIN);
        }
        set
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Session")
            .field("is_authenticated", &state.access.is_some())
            .field("access", &state.access.as_ref().map(|_| "***"))
            .field("renewal", &state.renewal.as_ref().map(|_| "***"))
            .field("epoch", &state.epoch)
            .finish()
    }
}
