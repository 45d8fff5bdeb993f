//! Assembles the finance tools an agent is configured with

use hive_tools::Tool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::api::{QuoteSummaryClient, YahooFinanceClient, yahoo_rate_limiter};
use crate::cache::FinanceCache;
use crate::config::FinanceConfig;
use crate::error::Result;
use crate::tools::{
    AnalystRecommendationsTool, CompanyInfoTool, StockFundamentalsTool, StockPriceTool,
};

/// Which finance tools to hand an agent; all off by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceToolSelection {
    pub stock_price: bool,
    pub analyst_recommendations: bool,
    pub stock_fundamentals: bool,
    pub company_info: bool,
}

impl FinanceToolSelection {
    /// Every finance tool enabled
    pub fn all() -> Self {
        Self {
            stock_price: true,
            analyst_recommendations: true,
            stock_fundamentals: true,
            company_info: true,
        }
    }

    /// True when no tool is selected
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Shared clients and caches behind the finance tools
///
/// One toolkit serves every agent, so caches and the Yahoo rate limit are
/// process-wide.
pub struct FinanceToolkit {
    yahoo: YahooFinanceClient,
    summary: Arc<QuoteSummaryClient>,
    realtime: FinanceCache,
    fundamental: FinanceCache,
}

impl FinanceToolkit {
    /// Build the clients and caches
    pub fn new(config: &FinanceConfig) -> Result<Self> {
        config.validate()?;
        let limiter = yahoo_rate_limiter(config.yahoo_requests_per_minute)?;

        Ok(Self {
            yahoo: YahooFinanceClient::new(Arc::clone(&limiter)),
            summary: Arc::new(QuoteSummaryClient::new(config, limiter)?),
            realtime: FinanceCache::new(config.cache_ttl_realtime),
            fundamental: FinanceCache::new(config.cache_ttl_fundamental),
        })
    }

    /// Instantiate the selected tools, in a fixed order
    pub fn tools(&self, selection: FinanceToolSelection) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = Vec::new();

        if selection.stock_price {
            tools.push(Arc::new(StockPriceTool::new(
                self.yahoo.clone(),
                self.realtime.clone(),
            )));
        }
        if selection.analyst_recommendations {
            tools.push(Arc::new(AnalystRecommendationsTool::new(
                Arc::clone(&self.summary),
                self.fundamental.clone(),
            )));
        }
        if selection.stock_fundamentals {
            tools.push(Arc::new(StockFundamentalsTool::new(
                Arc::clone(&self.summary),
                self.fundamental.clone(),
            )));
        }
        if selection.company_info {
            tools.push(Arc::new(CompanyInfoTool::new(
                Arc::clone(&self.summary),
                self.fundamental.clone(),
            )));
        }

        debug!("Built {} finance tools", tools.len());
        tools
    }
}
