//! Finance tools for LLM agents
//!
//! Every tool takes a single `symbol` argument and returns JSON.

pub mod analyst;
pub mod company_info;
pub mod fundamentals;
pub mod stock_price;

pub use analyst::AnalystRecommendationsTool;
pub use company_info::CompanyInfoTool;
pub use fundamentals::StockFundamentalsTool;
pub use stock_price::StockPriceTool;

use crate::error::{FinanceError, Result};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct SymbolParams {
    symbol: String,
}

/// Extract and normalize the `symbol` argument
pub(crate) fn parse_symbol(params: Value) -> hive_core::Result<String> {
    let params: SymbolParams = serde_json::from_value(params).map_err(|e| {
        hive_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
    })?;
    Ok(normalize_symbol(&params.symbol)?)
}

/// Uppercase a ticker and reject anything that cannot be one
pub(crate) fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 15
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if valid {
        Ok(symbol)
    } else {
        Err(FinanceError::InvalidSymbol(raw.to_string()))
    }
}

pub(crate) fn symbol_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Stock ticker symbol (e.g., 'NVDA', 'TSLA', 'BRK-B')"
            }
        },
        "required": ["symbol"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" nvda ").unwrap(), "NVDA");
        assert_eq!(normalize_symbol("brk-b").unwrap(), "BRK-B");
        assert_eq!(normalize_symbol("^gspc").unwrap(), "^GSPC");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("NVDA; DROP").is_err());
        assert!(normalize_symbol("ABCDEFGHIJKLMNOPQ").is_err());
    }

    #[test]
    fn test_parse_symbol() {
        assert_eq!(parse_symbol(json!({"symbol": "tsla"})).unwrap(), "TSLA");
        let err = parse_symbol(json!({"ticker": "TSLA"})).unwrap_err();
        assert!(err.to_string().contains("Invalid parameters"));
    }
}
