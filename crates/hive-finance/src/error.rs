//! Failures fetching market data

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FinanceError>;

#[derive(Debug, Error)]
pub enum FinanceError {
    /// Yahoo answered, but with an error payload or unexpected status
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The symbol exists but Yahoo has nothing for the requested module
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Raised by the chart client in `yahoo_finance_api`
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<yahoo_finance_api::YahooError> for FinanceError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        Self::YahooFinanceError(err.to_string())
    }
}

/// Tool failures reach the model as text; bad settings stay configuration errors
impl From<FinanceError> for hive_core::Error {
    fn from(err: FinanceError) -> Self {
        if let FinanceError::ConfigError(message) = err {
            Self::Configuration(message)
        } else {
            Self::ProcessingFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message() {
        let err = FinanceError::DataUnavailable {
            symbol: "NVDA".to_string(),
            reason: "No recommendation trend".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for NVDA: No recommendation trend");
    }

    #[test]
    fn test_into_core_error() {
        let err: hive_core::Error = FinanceError::InvalidSymbol("???".to_string()).into();
        assert_eq!(err.to_string(), "Agent processing failed: Invalid symbol: ???");

        let err: hive_core::Error = FinanceError::ConfigError("bad ttl".to_string()).into();
        assert!(matches!(err, hive_core::Error::Configuration(m) if m == "bad ttl"));
    }
}
