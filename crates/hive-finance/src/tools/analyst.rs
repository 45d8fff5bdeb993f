//! `get_analyst_recommendations` tool

use async_trait::async_trait;
use hive_core::Result as CoreResult;
use hive_tools::Tool;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{parse_symbol, symbol_schema};
use crate::api::{QuoteSummary, QuoteSummaryClient, SummaryModule};
use crate::cache::{CacheKey, FinanceCache};
use crate::error::{FinanceError, Result};

const MODULES: &[SummaryModule] = &[
    SummaryModule::RecommendationTrend,
    SummaryModule::FinancialData,
];

/// Analyst rating counts and price targets
pub struct AnalystRecommendationsTool {
    client: Arc<QuoteSummaryClient>,
    cache: FinanceCache,
}

impl AnalystRecommendationsTool {
    pub fn new(client: Arc<QuoteSummaryClient>, cache: FinanceCache) -> Self {
        Self { client, cache }
    }
}

fn recommendations_payload(symbol: &str, summary: &QuoteSummary) -> Result<Value> {
    let trend = summary
        .recommendation_trend
        .as_ref()
        .map(|t| t.trend.as_slice())
        .unwrap_or_default();
    if trend.is_empty() {
        return Err(FinanceError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "No analyst recommendations published".to_string(),
        });
    }

    let periods: Vec<Value> = trend
        .iter()
        .map(|p| {
            json!({
                "period": p.period,
                "strong_buy": p.strong_buy,
                "buy": p.buy,
                "hold": p.hold,
                "sell": p.sell,
                "strong_sell": p.strong_sell,
            })
        })
        .collect();

    let financial = summary.financial_data.clone().unwrap_or_default();
    Ok(json!({
        "symbol": symbol,
        "consensus": financial.recommendation_key,
        "recommendation_mean": financial.recommendation_mean,
        "number_of_analyst_opinions": financial.number_of_analyst_opinions,
        "price_target": {
            "low": financial.target_low_price,
            "mean": financial.target_mean_price,
            "median": financial.target_median_price,
            "high": financial.target_high_price,
        },
        "trend": periods,
    }))
}

#[async_trait]
impl Tool for AnalystRecommendationsTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let symbol = parse_symbol(params)?;
        let key = CacheKey::new(&symbol, self.name());

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let summary = self.client.fetch(&symbol, MODULES).await?;
                recommendations_payload(&symbol, &summary)
            })
            .await?;

        Ok(value)
    }

    fn name(&self) -> &str {
        "get_analyst_recommendations"
    }

    fn description(&self) -> &str {
        "Get analyst recommendations for a ticker: buy/hold/sell counts for recent months, \
         the consensus rating and analyst price targets."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::quote_summary::{FinancialData, RecommendationPeriod, RecommendationTrend};

    #[test]
    fn test_payload() {
        let summary = QuoteSummary {
            recommendation_trend: Some(RecommendationTrend {
                trend: vec![RecommendationPeriod {
                    period: "0m".to_string(),
                    strong_buy: 10,
                    buy: 20,
                    hold: 5,
                    sell: 1,
                    strong_sell: 0,
                }],
            }),
            financial_data: Some(FinancialData {
                recommendation_key: Some("buy".to_string()),
                target_mean_price: Some(150.0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let payload = recommendations_payload("NVDA", &summary).unwrap();
        assert_eq!(payload["consensus"], "buy");
        assert_eq!(payload["price_target"]["mean"], 150.0);
        assert!(payload["price_target"]["high"].is_null());
        assert_eq!(payload["trend"][0]["strong_buy"], 10);
    }

    #[test]
    fn test_payload_without_trend() {
        let err = recommendations_payload("XYZ", &QuoteSummary::default()).unwrap_err();
        assert!(matches!(err, FinanceError::DataUnavailable { .. }));
    }
}
