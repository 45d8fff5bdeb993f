//! Shared utilities for hive
//!
//! Logging setup and the environment-variable helpers the service config is
//! built from.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_or, optional_env};
pub use logging::{LogFormat, init_tracing_with};
