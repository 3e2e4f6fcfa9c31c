use thiserror::Error;

/// Why a completion request failed. The client decides the kind from the
/// HTTP exchange so callers never inspect message text.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("no API key configured for {provider} (set {variable})")]
    MissingApiKey {
        provider: String,
        variable: &'static str,
    },

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("model '{model}' not found or unavailable")]
    ModelNotFound { model: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for AIError {
    fn from(error: serde_json::Error) -> Self {
        AIError::MalformedResponse(format!("JSON error: {}", error))
    }
}
