//! Wire types for the `/auth/*` endpoints, with the backend's casing.

use serde::{Deserialize, Serialize};

/// Body of a successful `POST /auth/refreshToken`.
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of a successful `GET /auth/verifyMagicLink`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkVerification {
    pub access: String,
    pub refresh: String,
    pub profile_complete: bool,
}

/// Body of `GET /auth/provider/login`.
#[derive(Debug, Deserialize)]
pub struct ProviderLoginStart {
    #[serde(rename = "authURL")]
    pub auth_url: String,
    #[serde(rename = "codeVerifier")]
    pub code_verifier: String,
}

/// Request body for the provider callback exchange.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCallbackRequest<'a> {
    pub response: &'a str,
    pub code_verifier: &'a str,
}

/// Body of a successful provider callback exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCallbackExchange {
    pub access: String,
    pub refresh: String,
    pub id_token: Option<String>,
}

/// Request body for `POST /auth/provider/logout`.
#[derive(Debug, Serialize)]
pub struct ProviderLogoutRequest<'a> {
    pub post_logout_redirect_uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<&'a str>,
}

/// Body of a successful `POST /auth/provider/logout`.
#[derive(Debug, Deserialize)]
pub struct ProviderLogoutResponse {
    #[serde(rename = "logoutURL")]
    pub logout_url: String,
}
