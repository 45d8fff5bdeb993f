//! Tunables for the Yahoo clients and the finance tool caches

use crate::error::{FinanceError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of Yahoo's JSON query API, used for quoteSummary
pub const YAHOO_QUERY_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo answers bare clients with 403, so the quoteSummary client
/// presents itself as a desktop browser.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// How long a price stays fresh
    pub cache_ttl_realtime: Duration,
    /// How long profiles, fundamentals and analyst ratings stay fresh
    pub cache_ttl_fundamental: Duration,
    pub request_timeout: Duration,
    /// Budget shared by every tool in one toolkit
    pub yahoo_requests_per_minute: u32,
    pub query_base_url: String,
    pub user_agent: String,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_realtime: Duration::from_secs(60),
            cache_ttl_fundamental: Duration::from_secs(60 * 60),
            request_timeout: Duration::from_secs(30),
            yahoo_requests_per_minute: 60,
            query_base_url: YAHOO_QUERY_BASE_URL.to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl FinanceConfig {
    /// Start from the defaults and override selectively
    ///
    /// ```
    /// use hive_finance::FinanceConfig;
    ///
    /// let config = FinanceConfig::builder().yahoo_requests_per_minute(30).build()?;
    /// assert_eq!(config.yahoo_requests_per_minute, 30);
    /// # Ok::<(), hive_finance::FinanceError>(())
    /// ```
    pub fn builder() -> FinanceConfigBuilder {
        FinanceConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let problem = if self.yahoo_requests_per_minute == 0 {
            "yahoo_requests_per_minute must be greater than 0".to_string()
        } else if self.request_timeout.is_zero() {
            "request_timeout must be greater than 0".to_string()
        } else if self.cache_ttl_realtime.is_zero() || self.cache_ttl_fundamental.is_zero() {
            "cache TTLs must be greater than 0".to_string()
        } else if !self.query_base_url.starts_with("http") {
            format!("query_base_url is not an HTTP URL: {}", self.query_base_url)
        } else {
            return Ok(());
        };
        Err(FinanceError::ConfigError(problem))
    }
}

/// Overrides on top of [`FinanceConfig::default`], checked on `build`
#[derive(Debug)]
pub struct FinanceConfigBuilder {
    config: FinanceConfig,
}

impl FinanceConfigBuilder {
    pub fn cache_ttl_realtime(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl_realtime = ttl;
        self
    }

    pub fn cache_ttl_fundamental(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl_fundamental = ttl;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn yahoo_requests_per_minute(mut self, rpm: u32) -> Self {
        self.config.yahoo_requests_per_minute = rpm;
        self
    }

    /// Point the quoteSummary client elsewhere, e.g. at a local mock
    pub fn query_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.query_base_url = url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<FinanceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FinanceConfig::default();
        assert_eq!(config.cache_ttl_realtime, Duration::from_secs(60));
        assert_eq!(config.cache_ttl_fundamental, Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_keeps_untouched_defaults() {
        let config = FinanceConfig::builder()
            .request_timeout(Duration::from_secs(5))
            .query_base_url("http://127.0.0.1:9000")
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.query_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.yahoo_requests_per_minute, 60);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            FinanceConfig::builder().yahoo_requests_per_minute(0),
            FinanceConfig::builder().request_timeout(Duration::ZERO),
            FinanceConfig::builder().cache_ttl_fundamental(Duration::ZERO),
            FinanceConfig::builder().query_base_url("ftp://example.com"),
        ];
        for builder in cases {
            assert!(matches!(builder.build(), Err(FinanceError::ConfigError(_))));
        }
    }
}
