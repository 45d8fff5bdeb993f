//! One model call: what is sent and what comes back

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Output budget used when a request does not set one
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// Everything a provider needs for one completion
///
/// ```
/// use hive_llm::{CompletionRequest, Message};
///
/// let request = CompletionRequest::new("qwen-2.5-32b", vec![Message::user("Hello")])
///     .with_system("Always include the sources")
///     .with_tools(Vec::new());
/// assert!(!request.has_tools());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-specific model id
    pub model: String,

    /// Conversation so far, oldest first
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: usize,

    /// `None` leaves sampling to the provider default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Never `Some` of an empty list; see [`CompletionRequest::with_tools`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tools: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Offer tools to the model; an empty list offers none
    ///
    /// Both Groq and Gemini reject an empty tool array.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// What the model produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Why the model stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    /// Output budget exhausted; the text may be cut off
    MaxTokens,
    /// The model wants tool results before it continues
    ToolUse,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::EndTurn => "end_turn",
            StopReason::MaxTokens => "max_tokens",
            StopReason::ToolUse => "tool_use",
        })
    }
}

/// Token counts as reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// Summing usage across the calls of one agent run
impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request = CompletionRequest::new("gemini-2.0-flash", vec![Message::user("Hello")])
            .with_system("You are the orchestrator")
            .with_temperature(Some(0.7));

        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(request.temperature, Some(0.7));
        assert!(!request.has_tools());
    }

    #[test]
    fn test_empty_tools_offer_none() {
        let request = CompletionRequest::new("m", Vec::new()).with_tools(Vec::new());
        assert!(request.tools.is_none());

        let request = request.with_tools(vec![ToolDefinition::new(
            "web_search",
            "Search the web",
            json!({"type": "object"}),
        )]);
        assert!(request.has_tools());
    }

    #[test]
    fn test_usage_accumulates() {
        let mut usage = TokenUsage::default();
        usage += TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        usage += TokenUsage {
            input_tokens: 20,
            output_tokens: 5,
        };
        assert_eq!(usage.total(), 175);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::ToolUse.to_string(), "tool_use");
        assert_eq!(
            serde_json::to_value(StopReason::MaxTokens).unwrap(),
            json!("max_tokens")
        );
    }
}
