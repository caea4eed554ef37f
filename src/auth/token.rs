//! Expiry inspection for the self-describing access token.
//!
//! The access token is a compact JWT; only the claims segment is decoded here
//! and only the `exp` claim is read. Signature verification belongs to the
//! backend. Any token that cannot be decoded is reported as expired, never as
//! valid.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Safety margin so a request is never dispatched with a credential that
/// could expire mid-flight.
pub const SKEW_MS: i64 = 30_000;

#[derive(Debug, Deserialize)]
struct AccessClaims {
    exp: i64,
}

/// Decode the expiry instant (unix seconds) from a compact-form token.
/// Returns `None` for any malformed token: wrong segment count, invalid
/// base64url, invalid JSON, or a missing `exp` claim.
pub(crate) fn expiry_unix_seconds(token: &str) -> Option<i64> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let claims_b64 = parts.next()?;
    let _signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let bytes = Base64UrlUnpadded::decode_vec(claims_b64).ok()?;
    let claims: AccessClaims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}

/// Whether the token is expired at `now_ms` (unix milliseconds), including
/// the skew window. Undecodable tokens are always expired.
#[must_use]
pub fn is_expired_at(token: &str, now_ms: i64) -> bool {
    match expiry_unix_seconds(token) {
        Some(exp) => exp * 1000 < now_ms + SKEW_MS,
        None => true,
    }
}

/// Whether the token is expired now. Never fails.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_unix_ms())
}

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
