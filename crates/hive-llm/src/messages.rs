//! Conversation turns exchanged with a model
//!
//! An assistant turn that wants tools carries [`ContentBlock::ToolUse`]
//! blocks. The next user turn answers each one with a
//! [`ContentBlock::ToolResult`] carrying the same id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Only Groq accepts this inline; Gemini takes system text out of band
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },

    /// The model asks for `name` to run with `input` as arguments
    ToolUse { id: String, name: String, input: Value },

    ToolResult {
        tool_use_id: String,
        /// Gemini pairs results with calls by function name, not id
        name: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// `None` for an assistant turn that produced nothing at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    fn new(role: Role, content: MessageContent) -> Self {
        Self {
            role,
            content: Some(content),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(text.into()))
    }

    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self::new(Role::Assistant, MessageContent::Blocks(blocks))
    }

    /// The user turn answering every tool call of the previous assistant turn
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self::new(Role::User, MessageContent::Blocks(results))
    }

    pub fn tool_result(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        result: impl Into<String>,
    ) -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            content: result.into(),
            is_error: None,
        }
    }

    /// Like [`Message::tool_result`] but flagged so the model treats it as a failure
    pub fn tool_error(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        error: impl Into<String>,
    ) -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            content: error.into(),
            is_error: Some(true),
        }
    }

    fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }

    /// Text of the turn, with text blocks joined by newlines
    ///
    /// `None` when the turn holds only tool calls or results.
    pub fn text(&self) -> Option<String> {
        if let Some(MessageContent::Text(text)) = &self.content {
            return Some(text.clone());
        }
        let joined = self
            .blocks()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        (!joined.is_empty()).then_some(joined)
    }

    /// The tool calls requested in this turn, in order
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.blocks()
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
            .collect()
    }

    pub fn has_tool_uses(&self) -> bool {
        self.blocks()
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }
}
