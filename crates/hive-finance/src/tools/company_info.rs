//! `get_company_info` tool

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
    SummaryModule::Price,
    SummaryModule::SummaryDetail,
    SummaryModule::DefaultKeyStatistics,
    SummaryModule::FinancialData,
    SummaryModule::AssetProfile,
];

/// Company profile and headline figures
pub struct CompanyInfoTool {
    client: Arc<QuoteSummaryClient>,
    cache: FinanceCache,
}

impl CompanyInfoTool {
    pub fn new(client: Arc<QuoteSummaryClient>, cache: FinanceCache) -> Self {
        Self { client, cache }
    }
}

fn company_payload(symbol: &str, summary: &QuoteSummary) -> Result<Value> {
    let Some(profile) = summary.asset_profile.clone() else {
        return Err(FinanceError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "No company profile".to_string(),
        });
    };
    let price = summary.price.clone().unwrap_or_default();
    let detail = summary.summary_detail.clone().unwrap_or_default();
    let stats = summary.default_key_statistics.clone().unwrap_or_default();
    let financial = summary.financial_data.clone().unwrap_or_default();

    let address = [
        profile.address1.as_deref(),
        profile.city.as_deref(),
        profile.state.as_deref(),
        profile.zip.as_deref(),
        profile.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    Ok(json!({
        "name": price.long_name.or(price.short_name),
        "symbol": symbol,
        "exchange": price.exchange_name,
        "currency": price.currency,
        "current_price": price.regular_market_price.or(financial.current_price),
        "market_cap": price.market_cap.or(detail.market_cap),
        "sector": profile.sector,
        "industry": profile.industry,
        "address": if address.is_empty() { None } else { Some(address) },
        "website": profile.website,
        "employees": profile.full_time_employees.map(|n| n as u64),
        "eps": stats.trailing_eps,
        "pe_ratio": detail.trailing_pe,
        "52_week_low": detail.fifty_two_week_low,
        "52_week_high": detail.fifty_two_week_high,
        "50_day_average": detail.fifty_day_average,
        "200_day_average": detail.two_hundred_day_average,
        "analyst_recommendation": financial.recommendation_key,
        "number_of_analyst_opinions": financial.number_of_analyst_opinions,
        "total_cash": financial.total_cash,
        "free_cashflow": financial.free_cashflow,
        "operating_cashflow": financial.operating_cashflow,
        "ebitda": financial.ebitda,
        "revenue_growth": financial.revenue_growth,
        "gross_margins": financial.gross_margins,
        "ebitda_margins": financial.ebitda_margins,
        "summary": profile.long_business_summary,
    }))
}

#[async_trait]
impl Tool for CompanyInfoTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let symbol = parse_symbol(params)?;
        let key = CacheKey::new(&symbol, self.name());

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let summary = self.client.fetch(&symbol, MODULES).await?;
                company_payload(&symbol, &summary)
            })
            .await?;

        Ok(value)
    }

    fn name(&self) -> &str {
        "get_company_info"
    }

    fn description(&self) -> &str {
        "Get company profile and overview for a ticker: name, sector, industry, address, \
         website, employees, business summary and headline financial figures."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}
