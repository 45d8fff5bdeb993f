//! Yahoo Finance API clients
//!
//! [`YahooFinanceClient`] reads prices from the chart API through
//! `yahoo_finance_api`. [`QuoteSummaryClient`] reads company, fundamental and
//! analyst modules from the quoteSummary API. Both draw on one shared rate
//! limiter since they hit the same host.

pub mod quote_summary;
pub mod yahoo;

pub use quote_summary::{QuoteSummary, QuoteSummaryClient, SummaryModule};
pub use yahoo::{PriceSnapshot, YahooFinanceClient};

use crate::error::{FinanceError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter shared by the Yahoo clients
pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a limiter allowing `per_minute` requests per minute
pub fn yahoo_rate_limiter(per_minute: u32) -> Result<SharedRateLimiter> {
    let per_minute = NonZeroU32::new(per_minute).ok_or_else(|| {
        FinanceError::ConfigError("Yahoo rate limit must be greater than 0".to_string())
    })?;
    Ok(Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))))
}
