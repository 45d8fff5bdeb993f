//! hive service
//!
//! Loads the agent catalogue, builds the agent hierarchy and serves it over
//! HTTP. `POST /query` with `{"query": "..."}` answers `{"response": "..."}`.

pub mod catalog;
pub mod config;
pub mod hierarchy;
pub mod server;

pub use catalog::{AgentDefinition, Catalog, CatalogError, ModelRef, ToolSpec};
pub use config::ServiceConfig;
pub use hierarchy::HierarchyBuilder;
pub use server::{AppState, router, run, serve};
