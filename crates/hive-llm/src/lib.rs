//! LLM provider abstraction layer for hive
//!
//! This crate provides provider-agnostic abstractions for talking to hosted
//! language models:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Tool definitions for function calling
//! - Provider trait for LLM implementations
//! - Concrete providers for Groq and Google Gemini (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{
    CompletionRequest, CompletionResponse, DEFAULT_MAX_TOKENS, StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(any(feature = "groq", feature = "gemini"))]
pub mod providers;
