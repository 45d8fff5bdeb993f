//! Failures talking to a model provider

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Non-success status not covered by a more specific variant
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// HTTP 429; Groq's free tier hits this often
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The body parsed but did not contain what a completion needs
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Classify an error response from either provider
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            400 => Self::InvalidRequest(body),
            401 | 403 => Self::AuthenticationFailed,
            404 => Self::ModelNotFound(model.to_string()),
            429 => Self::RateLimitExceeded(body),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }

    /// Whether waiting and sending the same request again could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) | Self::HttpError(_) => true,
            Self::RequestFailed(message) => message.starts_with("HTTP 5"),
            _ => false,
        }
    }
}
