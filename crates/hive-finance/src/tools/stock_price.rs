//! `get_current_stock_price` tool

use async_trait::async_trait;
use hive_core::Result as CoreResult;
use hive_tools::Tool;
use serde_json::{Value, json};

use super::{parse_symbol, symbol_schema};
use crate::api::{PriceSnapshot, YahooFinanceClient};
use crate::cache::{CacheKey, FinanceCache};
use crate::error::FinanceError;

/// Latest price for a ticker
pub struct StockPriceTool {
    client: YahooFinanceClient,
    cache: FinanceCache,
}

impl StockPriceTool {
    /// Create the tool; `cache` should use the real-time TTL
    pub fn new(client: YahooFinanceClient, cache: FinanceCache) -> Self {
        Self { client, cache }
    }
}

fn price_payload(snapshot: &PriceSnapshot) -> Value {
    json!({
        "symbol": snapshot.symbol,
        "price": snapshot.close,
        "previous_close": snapshot.previous_close,
        "change": snapshot.change(),
        "change_percent": snapshot.change_percent(),
        "day_open": snapshot.open,
        "day_high": snapshot.high,
        "day_low": snapshot.low,
        "volume": snapshot.volume,
        "as_of": snapshot.timestamp.to_rfc3339(),
    })
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let symbol = parse_symbol(params)?;
        let key = CacheKey::new(&symbol, self.name());

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let snapshot = self.client.get_price_snapshot(&symbol).await?;
                Ok::<_, FinanceError>(price_payload(&snapshot))
            })
            .await?;

        Ok(value)
    }

    fn name(&self) -> &str {
        "get_current_stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price for a ticker symbol, with the day's range, \
         volume and change against the previous close."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}
