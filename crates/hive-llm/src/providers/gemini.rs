//! Google Gemini provider
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! See: https://ai.google.dev/api/generate-content
//!
//! Gemini has no tool call ids. Function calls get a synthesized id so the
//! rest of the workspace can pair calls with results, and results are sent
//! back by function name.

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Generative Language API root
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, sent in the `x-goog-api-key` header
    pub api_key: String,

    /// Base URL (default: v1beta endpoint)
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Create a new configuration with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: GEMINI_API_BASE.to_string(),
            timeout_secs: 120,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a provider from configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(provider = "gemini", model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = build_request(&request);
        debug!("Gemini request: contents={}", body.contents.len());

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base, request.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status, error_text, &request.model));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse Gemini response: {e}"))
        })?;

        parse_response(api_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ── Gemini wire types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiToolDecl>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// A content part; exactly one field is set on the way out
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolDecl {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

// ── Conversion ──

fn build_request(request: &CompletionRequest) -> GenerateContentRequest {
    let mut system_parts: Vec<GeminiPart> = request
        .system
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| GeminiPart::text(s.clone()))
        .collect();

    let mut contents = Vec::with_capacity(request.messages.len());
    for msg in &request.messages {
        if msg.role == Role::System {
            // Gemini only accepts system text out of band
            system_parts.extend(convert_parts(msg));
            continue;
        }
        let parts = convert_parts(msg);
        if parts.is_empty() {
            continue;
        }
        contents.push(GeminiContent {
            role: Some(gemini_role(msg.role).to_string()),
            parts,
        });
    }

    GenerateContentRequest {
        contents,
        system_instruction: if system_parts.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: system_parts,
            })
        },
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        },
        tools: request
            .tools
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| vec![convert_tools(t)])
            .unwrap_or_default(),
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    }
}

fn convert_parts(msg: &Message) -> Vec<GeminiPart> {
    match &msg.content {
        None => vec![],
        Some(MessageContent::Text(text)) if text.is_empty() => vec![],
        Some(MessageContent::Text(text)) => vec![GeminiPart::text(text.clone())],
        Some(MessageContent::Blocks(blocks)) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } if text.is_empty() => None,
                ContentBlock::Text { text } => Some(GeminiPart::text(text.clone())),
                ContentBlock::ToolUse { name, input, .. } => Some(GeminiPart {
                    function_call: Some(GeminiFunctionCall {
                        name: name.clone(),
                        args: input.clone(),
                    }),
                    ..GeminiPart::default()
                }),
                ContentBlock::ToolResult {
                    name,
                    content,
                    is_error,
                    ..
                } => {
                    let response = if is_error.unwrap_or(false) {
                        serde_json::json!({ "error": content })
                    } else {
                        serde_json::json!({ "result": content })
                    };
                    Some(GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            name: name.clone(),
                            response,
                        }),
                        ..GeminiPart::default()
                    })
                }
            })
            .collect(),
    }
}

fn convert_tools(tools: &[ToolDefinition]) -> GeminiToolDecl {
    GeminiToolDecl {
        function_declarations: tools
            .iter()
            .map(|t| GeminiFunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.input_schema.clone(),
            })
            .collect(),
    }
}

fn parse_response(resp: GenerateContentResponse) -> Result<CompletionResponse> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        let reason = resp
            .prompt_feedback
            .map_or_else(|| "no candidates".to_string(), |f| f.to_string());
        return Err(LLMError::UnexpectedResponse(format!(
            "Gemini returned no candidates: {reason}"
        )));
    };

    let mut blocks = Vec::new();
    for (index, part) in candidate.content.parts.into_iter().enumerate() {
        if let Some(text) = part.text.filter(|t| !t.is_empty()) {
            blocks.push(ContentBlock::Text { text });
        }
        if let Some(call) = part.function_call {
            let input = if call.args.is_null() {
                serde_json::json!({})
            } else {
                call.args
            };
            blocks.push(ContentBlock::ToolUse {
                id: format!("call_{index}_{}", call.name),
                name: call.name,
                input,
            });
        }
    }

    let message = Message::assistant_blocks(blocks);
    let stop_reason = if message.has_tool_uses() {
        StopReason::ToolUse
    } else {
        map_finish_reason(candidate.finish_reason.as_deref())
    };

    let usage = resp.usage_metadata.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    debug!(
        "Gemini response - stop: {:?}, tokens: {}/{}",
        stop_reason, usage.input_tokens, usage.output_tokens
    );

    Ok(CompletionResponse {
        message,
        stop_reason,
        usage,
    })
}

fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("STOP") | None => StopReason::EndTurn,
        Some(other) => {
            warn!("Gemini finished with reason {}", other);
            StopReason::EndTurn
        }
    }
}
