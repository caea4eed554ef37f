//! # Clubdesk client
//!
//! Client for the clubdesk multi-tenant club-management service. The part
//! that matters lives in [`auth`]: the session and token-lifecycle manager.
//!
//! ## Credentials
//!
//! The backend issues a short-lived, self-describing access token and a
//! long-lived opaque renewal token. The access token is attached to every
//! API request; when it is within 30 seconds of expiry the transport renews
//! it first. Renewal is single-flight: concurrent requests racing the same
//! expiry queue behind one renewal call and share its outcome, in order.
//! A rejected renewal ends the session: credentials are cleared and the
//! browsing context returns to the login entry point. Any ambiguity about
//! credential validity resolves toward "invalid" (fail closed).
//!
//! ## Login flows
//!
//! Three producers of a credential pair converge on `Session::login`:
//! hydration from persisted state on start, one-time emailed-link
//! verification (guarded so a single-use token is never replayed), and a
//! delegated identity-provider flow with a backend-supplied PKCE verifier.
//!
//! ## Guarding views
//!
//! [`auth::guard`] decides what a protected view does: redirect to login
//! (carrying the current location), show a loading state while the profile
//! is fetched, redirect to profile setup, or render.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
