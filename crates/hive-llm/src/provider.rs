//! The seam between agents and hosted models

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A hosted model API
///
/// Implementations own the HTTP client and the vendor wire format. Agents
/// only ever see [`CompletionRequest`] and [`CompletionResponse`].
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short label for logs, e.g. `groq`
    fn name(&self) -> &str;
}
