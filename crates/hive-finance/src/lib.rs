//! Financial data tools for hive agents
//!
//! Prices come from Yahoo Finance's chart API through `yahoo_finance_api`.
//! Company profiles, fundamentals and analyst ratings come from Yahoo's
//! quoteSummary API. Results are cached with a TTL and all Yahoo traffic
//! shares one rate limiter.
//!
//! ```no_run
//! use hive_finance::{FinanceConfig, FinanceToolSelection, FinanceToolkit};
//!
//! # fn example() -> hive_finance::Result<()> {
//! let toolkit = FinanceToolkit::new(&FinanceConfig::default())?;
//! let tools = toolkit.tools(FinanceToolSelection::all());
//! assert_eq!(tools.len(), 4);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod toolkit;
pub mod tools;

pub use config::FinanceConfig;
pub use error::{FinanceError, Result};
pub use toolkit::{FinanceToolSelection, FinanceToolkit};
pub use tools::{
    AnalystRecommendationsTool, CompanyInfoTool, StockFundamentalsTool, StockPriceTool,
};
