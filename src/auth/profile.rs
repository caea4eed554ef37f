//! The signed-in member's profile, fetched lazily through the authenticated
//! transport and cached for the lifetime of the current credentials.

use crate::api::ApiClient;
use crate::auth::error::Error;
use crate::auth::session::Session;
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};

const PROFILE_PATH: &str = "/users/me";

/// Member profile as served by the backend (OData-style casing).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub setup_completed: bool,
}

impl Profile {
    /// Display name for greetings; falls back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Profile cache keyed by session epoch: whenever the credentials change
/// identity the cached profile is stale and the next read refetches.
#[derive(Debug, Default)]
pub struct ProfileCache {
    cached: Mutex<Option<(u64, Profile)>>,
}

impl ProfileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached profile, if one was fetched under the current credentials.
    /// `None` means a fetch is still needed (the guard renders its loading
    /// state off this).
    #[must_use]
    pub fn peek(&self, session: &Session) -> Option<Profile> {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        match &*cached {
            Some((epoch, profile)) if *epoch == session.epoch() => Some(profile.clone()),
            _ => None,
        }
    }

    /// Fetch the profile, reusing the cache while the credentials are
    /// unchanged.
    ///
    /// # Errors
    /// Returns an error if the profile request fails; the cache is left
    /// untouched so the next call retries.
    pub async fn get(&self, session: &Session, api: &ApiClient) -> Result<Profile, Error> {
        let epoch = session.epoch();
        if let Some(profile) = self.peek(session) {
            return Ok(profile);
        }

        let profile: Profile = api.get_json(PROFILE_PATH).await?;
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Some((epoch, profile.clone()));
        Ok(profile)
    }

    pub fn invalidate(&self) {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }
}
