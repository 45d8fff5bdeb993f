//! Core abstractions for hive
//!
//! This crate defines the traits and types every other hive crate builds on:
//! the [`Agent`] trait, the per-request [`Context`], and the shared error type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
