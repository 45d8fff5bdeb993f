//! Yahoo Finance quoteSummary client
//!
//! The quoteSummary API needs a session cookie and a matching "crumb" token.
//! The cookie comes from `fc.yahoo.com`, the crumb from `/v1/test/getcrumb`.
//! Both are fetched lazily and refreshed once when Yahoo rejects them.
//!
//! Numeric fields arrive as `{"raw": 1.23, "fmt": "1.23"}` objects; only the
//! raw value is kept.

use super::SharedRateLimiter;
use crate::config::FinanceConfig;
use crate::error::{FinanceError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";

/// quoteSummary modules this client knows how to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryModule {
    Price,
    SummaryDetail,
    DefaultKeyStatistics,
    FinancialData,
    AssetProfile,
    RecommendationTrend,
}

impl SummaryModule {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryModule::Price => "price",
            SummaryModule::SummaryDetail => "summaryDetail",
            SummaryModule::DefaultKeyStatistics => "defaultKeyStatistics",
            SummaryModule::FinancialData => "financialData",
            SummaryModule::AssetProfile => "assetProfile",
            SummaryModule::RecommendationTrend => "recommendationTrend",
        }
    }
}

/// Parsed quoteSummary result; modules not requested are `None`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    pub default_key_statistics: Option<KeyStatistics>,
    #[serde(default)]
    pub financial_data: Option<FinancialData>,
    #[serde(default)]
    pub asset_profile: Option<AssetProfile>,
    #[serde(default)]
    pub recommendation_trend: Option<RecommendationTrend>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default, deserialize_with = "raw_number")]
    pub regular_market_price: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub regular_market_previous_close: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetail {
    #[serde(default, deserialize_with = "raw_number")]
    pub previous_close: Option<f64>,
    #[serde(default, rename = "trailingPE", deserialize_with = "raw_number")]
    pub trailing_pe: Option<f64>,
    #[serde(default, rename = "forwardPE", deserialize_with = "raw_number")]
    pub forward_pe: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub beta: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub fifty_day_average: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub two_hundred_day_average: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub average_volume: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatistics {
    #[serde(default, deserialize_with = "raw_number")]
    pub enterprise_value: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub price_to_book: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub book_value: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub trailing_eps: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub forward_eps: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub peg_ratio: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub shares_outstanding: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub enterprise_to_ebitda: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    #[serde(default, deserialize_with = "raw_number")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub target_high_price: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub target_low_price: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub target_mean_price: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub target_median_price: Option<f64>,
    #[serde(default)]
    pub recommendation_key: Option<String>,
    #[serde(default, deserialize_with = "raw_number")]
    pub recommendation_mean: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub number_of_analyst_opinions: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub total_cash: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub total_debt: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub debt_to_equity: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub total_revenue: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub revenue_growth: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub earnings_growth: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub gross_margins: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub ebitda_margins: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub operating_margins: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub profit_margins: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub return_on_equity: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub ebitda: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub free_cashflow: Option<f64>,
    #[serde(default, deserialize_with = "raw_number")]
    pub operating_cashflow: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfile {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "raw_number")]
    pub full_time_employees: Option<f64>,
    #[serde(default)]
    pub long_business_summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendationTrend {
    #[serde(default)]
    pub trend: Vec<RecommendationPeriod>,
}

/// Analyst rating counts for one period (`0m` is the current month)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPeriod {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub strong_buy: u32,
    #[serde(default)]
    pub buy: u32,
    #[serde(default)]
    pub hold: u32,
    #[serde(default)]
    pub sell: u32,
    #[serde(default)]
    pub strong_sell: u32,
}

/// Accepts `{"raw": n, ...}`, a bare number, `{}` or null
fn raw_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        _ => None,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummary>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Turn a quoteSummary response body into the first result
pub(crate) fn parse_quote_summary(symbol: &str, body: &str) -> Result<QuoteSummary> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.quote_summary.error {
        return Err(if err.code == "Not Found" {
            FinanceError::InvalidSymbol(symbol.to_string())
        } else {
            FinanceError::ApiError(format!("{}: {}", err.code, err.description))
        });
    }

    envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FinanceError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "Empty quoteSummary result".to_string(),
        })
}

/// Client for the quoteSummary endpoint
pub struct QuoteSummaryClient {
    client: Client,
    base_url: String,
    crumb: Mutex<Option<String>>,
    rate_limiter: SharedRateLimiter,
}

impl QuoteSummaryClient {
    /// Create a client from configuration
    pub fn new(config: &FinanceConfig, rate_limiter: SharedRateLimiter) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.query_base_url.trim_end_matches('/').to_string(),
            crumb: Mutex::new(None),
            rate_limiter,
        })
    }

    /// Fetch `modules` for `symbol`
    pub async fn fetch(&self, symbol: &str, modules: &[SummaryModule]) -> Result<QuoteSummary> {
        let module_list = modules
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut refreshed = false;
        loop {
            let crumb = self.crumb(refreshed).await?;
            self.rate_limiter.until_ready().await;

            debug!("quoteSummary {} modules={}", symbol, module_list);
            let response = self
                .client
                .get(format!("{}/v10/finance/quoteSummary/{symbol}", self.base_url))
                .query(&[("modules", module_list.as_str()), ("crumb", crumb.as_str())])
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if !refreshed => {
                    warn!("Yahoo rejected the crumb, refreshing session");
                    refreshed = true;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(FinanceError::RateLimitExceeded {
                        provider: "Yahoo Finance".to_string(),
                    });
                }
                s if s.is_success() || s == StatusCode::NOT_FOUND => {
                    return parse_quote_summary(symbol, &body);
                }
                s => {
                    return Err(FinanceError::ApiError(format!(
                        "quoteSummary returned HTTP {s}"
                    )));
                }
            }
        }
    }

    /// Current crumb, fetching a fresh session when missing or `force`d
    async fn crumb(&self, force: bool) -> Result<String> {
        let mut guard = self.crumb.lock().await;
        if !force {
            if let Some(crumb) = guard.as_ref() {
                return Ok(crumb.clone());
            }
        }

        self.rate_limiter.until_ready().await;
        // Sets the session cookie; the status is usually 404 and irrelevant
        self.client.get(YAHOO_COOKIE_URL).send().await?;

        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .send()
            .await?;
        let status = response.status();
        let crumb = response.text().await?.trim().to_string();

        if !status.is_success() || crumb.is_empty() || crumb.contains('<') {
            *guard = None;
            return Err(FinanceError::ApiError(format!(
                "Failed to obtain Yahoo crumb (HTTP {status})"
            )));
        }

        info!("Obtained Yahoo Finance session crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }
}
