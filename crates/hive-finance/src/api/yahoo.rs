//! Yahoo Finance chart client

use super::SharedRateLimiter;
use crate::error::{FinanceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Latest trading day for a symbol, with the previous close when known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub previous_close: Option<f64>,
}

impl PriceSnapshot {
    /// Absolute change against the previous close
    pub fn change(&self) -> Option<f64> {
        self.previous_close.map(|prev| self.close - prev)
    }

    /// Percentage change against the previous close
    pub fn change_percent(&self) -> Option<f64> {
        self.previous_close
            .filter(|prev| *prev != 0.0)
            .map(|prev| (self.close - prev) / prev * 100.0)
    }
}

/// Yahoo Finance chart API client
#[derive(Clone)]
pub struct YahooFinanceClient {
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a client drawing on `rate_limiter`
    pub fn new(rate_limiter: SharedRateLimiter) -> Self {
        Self { rate_limiter }
    }

    /// Latest daily bar for `symbol`, plus the prior day's close
    pub async fn get_price_snapshot(&self, symbol: &str) -> Result<PriceSnapshot> {
        self.rate_limiter.until_ready().await;

        let provider = yahoo::YahooConnector::new()?;
        let response = provider.get_latest_quotes(symbol, "1d").await?;
        let quotes = response.quotes()?;

        debug!("Fetched {} daily bars for {}", quotes.len(), symbol);

        let (latest, earlier) = quotes
            .split_last()
            .ok_or_else(|| FinanceError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "No quotes returned".to_string(),
            })?;

        Ok(PriceSnapshot {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(latest.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
            open: latest.open,
            high: latest.high,
            low: latest.low,
            close: latest.close,
            volume: latest.volume,
            previous_close: earlier.last().map(|q| q.close),
        })
    }
}
