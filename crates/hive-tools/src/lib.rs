//! Tool management and execution framework for hive
//!
//! This crate provides the [`Tool`] trait agents call through their model,
//! a [`ToolRegistry`] to hold an agent's tools, and the DuckDuckGo backed
//! [`WebSearchTool`].

pub mod registry;
pub mod tool;
pub mod web_search;

pub use registry::ToolRegistry;
pub use tool::Tool;
pub use web_search::{WebSearchConfig, WebSearchTool};
