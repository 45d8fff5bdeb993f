//! The error every agent and tool returns

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Generic(String),

    /// A tool or agent could not be set up, e.g. its HTTP client
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Raised while answering a query; the HTTP layer returns this text
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ProcessingFailed(format!("malformed JSON: {err}"))
    }
}
