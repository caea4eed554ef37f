use thiserror::Error;

/// Errors surfaced by the auth session and the API transport.
///
/// The enum is `Clone` because a single renewal failure is fanned out to every
/// request queued behind the in-flight renewal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("renewal failed: {0}")]
    RenewalFailed(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout("request timed out".to_string())
        } else if err.is_decode() {
            Self::Parse(format!("failed to decode response: {err}"))
        } else {
            Self::Network(format!("unable to reach the server: {err}"))
        }
    }
}

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

/// Trims and truncates an HTTP error body for user-facing messages.
pub(crate) fn sanitize_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
