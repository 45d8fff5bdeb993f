//! `get_stock_fundamentals` tool

use async_trait::async_trait;
use hive_core::Result as CoreResult;
use hive_tools::Tool;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{parse_symbol, symbol_schema};
use crate::api::{QuoteSummary, QuoteSummaryClient, SummaryModule};
use crate::cache::{CacheKey, FinanceCache};
use crate::error::FinanceError;

const MODULES: &[SummaryModule] = &[
    SummaryModule::Price,
    SummaryModule::SummaryDetail,
    SummaryModule::DefaultKeyStatistics,
    SummaryModule::FinancialData,
    SummaryModule::AssetProfile,
];

/// Valuation ratios and financial health figures
pub struct StockFundamentalsTool {
    client: Arc<QuoteSummaryClient>,
    cache: FinanceCache,
}

impl StockFundamentalsTool {
    pub fn new(client: Arc<QuoteSummaryClient>, cache: FinanceCache) -> Self {
        Self { client, cache }
    }
}

fn fundamentals_payload(symbol: &str, summary: &QuoteSummary) -> Value {
    let price = summary.price.clone().unwrap_or_default();
    let detail = summary.summary_detail.clone().unwrap_or_default();
    let stats = summary.default_key_statistics.clone().unwrap_or_default();
    let financial = summary.financial_data.clone().unwrap_or_default();
    let profile = summary.asset_profile.clone().unwrap_or_default();

    json!({
        "symbol": symbol,
        "company_name": price.long_name.or(price.short_name),
        "sector": profile.sector,
        "industry": profile.industry,
        "currency": price.currency,
        "market_cap": price.market_cap.or(detail.market_cap),
        "enterprise_value": stats.enterprise_value,
        "pe_ratio": detail.trailing_pe,
        "forward_pe": detail.forward_pe,
        "peg_ratio": stats.peg_ratio,
        "pb_ratio": stats.price_to_book,
        "eps": stats.trailing_eps,
        "forward_eps": stats.forward_eps,
        "dividend_yield": detail.dividend_yield,
        "beta": detail.beta,
        "52_week_high": detail.fifty_two_week_high,
        "52_week_low": detail.fifty_two_week_low,
        "total_revenue": financial.total_revenue,
        "revenue_growth": financial.revenue_growth,
        "gross_margins": financial.gross_margins,
        "operating_margins": financial.operating_margins,
        "profit_margins": financial.profit_margins,
        "return_on_equity": financial.return_on_equity,
        "total_debt": financial.total_debt,
        "debt_to_equity": financial.debt_to_equity,
        "free_cashflow": financial.free_cashflow,
    })
}

#[async_trait]
impl Tool for StockFundamentalsTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let symbol = parse_symbol(params)?;
        let key = CacheKey::new(&symbol, self.name());

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let summary = self.client.fetch(&symbol, MODULES).await?;
                Ok::<_, FinanceError>(fundamentals_payload(&symbol, &summary))
            })
            .await?;

        Ok(value)
    }

    fn name(&self) -> &str {
        "get_stock_fundamentals"
    }

    fn description(&self) -> &str {
        "Get fundamental data for a ticker: market cap, P/E, P/B, EPS, dividend yield, beta, \
         52-week range, margins, growth and debt figures. Ratios such as yields and margins \
         are fractions (0.05 = 5%)."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::quote_summary::{KeyStatistics, PriceModule, SummaryDetail, parse_quote_summary};

    #[test]
    fn test_payload_merges_modules() {
        let summary = QuoteSummary {
            price: Some(PriceModule {
                short_name: Some("Tesla".to_string()),
                market_cap: Some(1.2e12),
                ..Default::default()
            }),
            summary_detail: Some(SummaryDetail {
                trailing_pe: Some(60.5),
                fifty_two_week_high: Some(488.5),
                market_cap: Some(9.9e11),
                ..Default::default()
            }),
            default_key_statistics: Some(KeyStatistics {
                price_to_book: Some(12.0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let payload = fundamentals_payload("TSLA", &summary);
        assert_eq!(payload["company_name"], "Tesla");
        assert_eq!(payload["market_cap"], 1.2e12);
        assert_eq!(payload["pe_ratio"], 60.5);
        assert_eq!(payload["pb_ratio"], 12.0);
        assert_eq!(payload["52_week_high"], 488.5);
        assert!(payload["sector"].is_null());
    }

    #[test]
    fn test_payload_from_yahoo_response() {
        let body = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/quote_summary_nvda.json"));
        let summary = parse_quote_summary("NVDA", body).unwrap();

        let payload = fundamentals_payload("NVDA", &summary);
        assert_eq!(payload["company_name"], "NVIDIA Corporation");
        assert_eq!(payload["pe_ratio"], 53.1);
        assert_eq!(payload["forward_pe"], 30.2);
        assert_eq!(payload["peg_ratio"], 1.2);
        assert_eq!(payload["eps"], 2.54);
        assert_eq!(payload["gross_margins"], 0.75);
        assert_eq!(payload["sector"], "Technology");
    }

    #[test]
    fn test_payload_with_no_modules() {
        let payload = fundamentals_payload("TSLA", &QuoteSummary::default());
        assert_eq!(payload["symbol"], "TSLA");
        assert!(payload["eps"].is_null());
    }
}
