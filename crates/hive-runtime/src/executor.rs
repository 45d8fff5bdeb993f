//! The loop that drives one agent: ask the model, run the tools it asks for,
//! feed the results back, and stop once it answers in plain text

use async_trait::async_trait;
use hive_core::{Context, Result};
use hive_llm::{
    CompletionRequest, ContentBlock, DEFAULT_MAX_TOKENS, LLMProvider, Message, StopReason,
    TokenUsage, ToolDefinition,
};
use hive_tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const ITERATIONS_EXHAUSTED: &str = "Max iterations reached without completion";
const TRUNCATED: &str = "Response truncated due to token limit";
const PREVIEW_CHARS: usize = 500;

/// Hooks into a run, all optional
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// `result` is the tool output, or the error text the model will see
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// The final answer, after any tool call prefix was applied
    async fn on_complete(&self, _answer: &str) {}

    async fn on_error(&self, _error: &str) {}
}

/// Logs every tool call an agent makes at info level
pub struct ToolCallLogger {
    agent: String,
}

impl ToolCallLogger {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }
}

#[async_trait]
impl ExecutorEventHandler for ToolCallLogger {
    async fn on_tool_start(&self, id: &str, name: &str, input: &Value) {
        info!(agent = %self.agent, tool_id = %id, "Running: {}", format_tool_call(name, input));
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: std::result::Result<&Value, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(_) => info!(agent = %self.agent, tool_name = %name, duration_ms, "Tool call finished"),
            Err(e) => warn!(agent = %self.agent, tool_name = %name, duration_ms, error = %e, "Tool call failed"),
        }
    }

    async fn on_error(&self, error: &str) {
        warn!(agent = %self.agent, error = %error, "Agent run failed");
    }
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on model calls in one run
    pub max_iterations: usize,
    pub model: String,
    pub system_prompt: Option<String>,
    /// Output budget of each model call
    pub max_tokens: usize,
    /// `None` leaves the provider default
    pub temperature: Option<f32>,
    /// Prefix the final answer with a ` - Running: tool(args)` line per call
    pub show_tool_calls: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: String::new(),
            system_prompt: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            show_tool_calls: false,
        }
    }
}

/// What one run has accumulated so far
struct Transcript {
    messages: Vec<Message>,
    /// Rendered `name(args)` of each call, in call order
    calls: Vec<String>,
    usage: TokenUsage,
}

/// Runs one agent's model against its tools until it answers
///
/// Tool failures and calls to tools the agent does not have go back to the
/// model as error results. Only a provider error ends the run early.
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: None,
        }
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Answer `user_message`
    ///
    /// `context` is handed to every tool call, which is how delegation depth
    /// follows the request down a team hierarchy.
    pub async fn run(&self, user_message: String, context: &mut Context) -> Result<String> {
        let outcome = self.drive(user_message, context).await;
        if let (Err(e), Some(handler)) = (&outcome, &self.event_handler) {
            handler.on_error(&e.to_string()).await;
        }
        outcome
    }

    async fn drive(&self, user_message: String, context: &mut Context) -> Result<String> {
        let tools = self.tool_definitions();
        let system = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(FALLBACK_SYSTEM_PROMPT);
        let mut transcript = Transcript {
            messages: vec![Message::user(user_message)],
            calls: Vec::new(),
            usage: TokenUsage::default(),
        };

        for iteration in 1..=self.config.max_iterations {
            debug!(
                iteration,
                model = %self.config.model,
                provider = %self.provider.name(),
                tools = tools.len(),
                "Calling model"
            );

            let request = CompletionRequest::new(&self.config.model, transcript.messages.clone())
                .with_system(system)
                .with_max_tokens(self.config.max_tokens)
                .with_temperature(self.config.temperature)
                .with_tools(tools.clone());
            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| {
                    warn!(iteration, transient = e.is_transient(), error = %e, "Model call failed");
                    hive_core::Error::ProcessingFailed(e.to_string())
                })?;

            transcript.usage += response.usage;
            info!(
                iteration,
                stop_reason = %response.stop_reason,
                tokens_in = response.usage.input_tokens,
                tokens_out = response.usage.output_tokens,
                run_tokens = transcript.usage.total(),
                "Model replied"
            );

            let reply = response.message;
            transcript.messages.push(reply.clone());

            match response.stop_reason {
                StopReason::ToolUse if reply.has_tool_uses() => {
                    let results = self.answer_tool_calls(&reply, context, &mut transcript.calls).await;
                    transcript.messages.push(Message::tool_results(results));
                }
                StopReason::MaxTokens => {
                    warn!(iteration, "Model hit its output budget");
                    let text = reply.text().unwrap_or_else(|| TRUNCATED.to_string());
                    return Ok(self.finish(text, &transcript.calls).await);
                }
                StopReason::EndTurn | StopReason::ToolUse => {
                    let text = reply.text().unwrap_or_default();
                    debug!(iteration, answer_len = text.len(), "Model answered");
                    return Ok(self.finish(text, &transcript.calls).await);
                }
            }
        }

        warn!(max_iterations = self.config.max_iterations, "Giving up without an answer");
        Ok(self.finish(ITERATIONS_EXHAUSTED.to_string(), &transcript.calls).await)
    }

    async fn finish(&self, answer: String, calls: &[String]) -> String {
        let answer = if self.config.show_tool_calls && !calls.is_empty() {
            let mut prefixed: String = calls.iter().map(|c| format!(" - Running: {c}\n")).collect();
            prefixed.push('\n');
            prefixed.push_str(&answer);
            prefixed
        } else {
            answer
        };

        if let Some(handler) = &self.event_handler {
            handler.on_complete(&answer).await;
        }
        answer
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .into_iter()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Run each requested call in order and collect one result block per call
    async fn answer_tool_calls(
        &self,
        reply: &Message,
        context: &mut Context,
        calls: &mut Vec<String>,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::new();
        for block in reply.tool_uses() {
            if let ContentBlock::ToolUse { id, name, input } = block {
                calls.push(format_tool_call(name, input));
                results.push(self.call_tool(id, name, input, context).await);
            }
        }
        results
    }

    async fn call_tool(&self, id: &str, name: &str, input: &Value, context: &mut Context) -> ContentBlock {
        debug!(tool_name = %name, tool_id = %id, input = %preview(&input.to_string()), "Calling tool");
        if let Some(handler) = &self.event_handler {
            handler.on_tool_start(id, name, input).await;
        }

        let started = Instant::now();
        let outcome = match self.tool_registry.get(name) {
            Some(tool) => tool
                .execute_with_context(input.clone(), context)
                .await
                .map_err(|e| e.to_string()),
            None => {
                warn!(tool_name = %name, "Model requested an unknown tool");
                Err(format!(
                    "Tool not found: {name}. Available tools: {}",
                    self.tool_registry.names().join(", ")
                ))
            }
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if let Some(handler) = &self.event_handler {
            handler
                .on_tool_done(id, name, outcome.as_ref().map_err(String::as_str), duration_ms)
                .await;
        }

        match outcome {
            Ok(value) => {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                debug!(tool_name = %name, duration_ms, output = %preview(&text), "Tool returned");
                Message::tool_result(id, name, text)
            }
            Err(error) => {
                warn!(tool_name = %name, duration_ms, %error, "Tool failed");
                Message::tool_error(id, name, format!("Error: {error}"))
            }
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Render a call as `name(key=value, ...)`
pub fn format_tool_call(name: &str, input: &Value) -> String {
    let args = match input {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{key}={s}"),
                other => format!("{key}={other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    format!("{name}({args})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_llm::{CompletionResponse, MessageContent};
    use hive_tools::Tool;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned responses and records every request
    struct ScriptedProvider {
        responses: Mutex<Vec<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<CompletionResponse>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> hive_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| hive_llm::LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn text(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn call(id: &str, name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(json!({ "echo": params["text"] }))
        }
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the text back"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        async fn execute(&self, _params: Value) -> Result<Value> {
            Err(hive_core::Error::ProcessingFailed("upstream down".to_string()))
        }
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo)).unwrap();
        registry.register(Arc::new(Failing)).unwrap();
        Arc::new(registry)
    }

    fn config() -> ExecutorConfig {
        ExecutorConfig {
            model: "test-model".to_string(),
            system_prompt: Some("Be brief".to_string()),
            ..Default::default()
        }
    }

    fn last_tool_result(request: &CompletionRequest) -> (String, Option<bool>) {
        match &request.messages.last().unwrap().content {
            Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult { content, is_error, .. } => (content.clone(), *is_error),
                other => panic!("Expected tool result, got {other:?}"),
            },
            other => panic!("Expected blocks, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert!(!config.show_tool_calls);
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_format_tool_call() {
        assert_eq!(
            format_tool_call("get_current_stock_price", &json!({"symbol": "NVDA"})),
            "get_current_stock_price(symbol=NVDA)"
        );
        assert_eq!(
            format_tool_call("web_search", &json!({"max_results": 3, "query": "rust"})),
            "web_search(max_results=3, query=rust)"
        );
        assert_eq!(format_tool_call("noop", &Value::Null), "noop()");
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = ScriptedProvider::new(vec![text("42")]);
        let executor = AgentExecutor::new(provider.clone(), registry(), config());

        let answer = executor.run("question".to_string(), &mut Context::new()).await.unwrap();
        assert_eq!(answer, "42");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].system.as_deref(), Some("Be brief"));
        let tool_names: Vec<_> = requests[0].tools.as_ref().unwrap().iter().map(|t| t.name.clone()).collect();
        assert_eq!(tool_names, vec!["echo", "failing"]);
    }

    #[tokio::test]
    async fn test_tool_results_fed_back() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "echo", json!({"text": "hi"})),
            text("done"),
        ]);
        let executor = AgentExecutor::new(provider.clone(), registry(), config());

        let answer = executor.run("go".to_string(), &mut Context::new()).await.unwrap();
        assert_eq!(answer, "done");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages.len(), 3);
        let (content, is_error) = last_tool_result(&requests[1]);
        assert_eq!(content, r#"{"echo":"hi"}"#);
        assert_eq!(is_error, None);
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_result() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "launch_rockets", json!({})),
            text("recovered"),
        ]);
        let executor = AgentExecutor::new(provider.clone(), registry(), config());

        let answer = executor.run("go".to_string(), &mut Context::new()).await.unwrap();
        assert_eq!(answer, "recovered");

        let (content, is_error) = last_tool_result(&provider.requests()[1]);
        assert!(content.contains("Tool not found: launch_rockets"));
        assert!(content.contains("echo, failing"));
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_tool_failure_becomes_error_result() {
        let provider = ScriptedProvider::new(vec![call("c1", "failing", json!({})), text("sorry")]);
        let executor = AgentExecutor::new(provider.clone(), registry(), config());

        executor.run("go".to_string(), &mut Context::new()).await.unwrap();
        let (content, is_error) = last_tool_result(&provider.requests()[1]);
        assert!(content.starts_with("Error: "));
        assert!(content.contains("upstream down"));
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_iteration_bound() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "echo", json!({"text": "1"})),
            call("c2", "echo", json!({"text": "2"})),
            call("c3", "echo", json!({"text": "3"})),
        ]);
        let executor = AgentExecutor::new(
            provider.clone(),
            registry(),
            ExecutorConfig {
                max_iterations: 2,
                ..config()
            },
        );

        let answer = executor.run("loop".to_string(), &mut Context::new()).await.unwrap();
        assert_eq!(answer, "Max iterations reached without completion");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_max_tokens_keeps_partial_text() {
        let provider = ScriptedProvider::new(vec![CompletionResponse {
            message: Message::assistant("partial ans"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::default(),
        }]);
        let executor = AgentExecutor::new(provider, registry(), config());
        let answer = executor.run("go".to_string(), &mut Context::new()).await.unwrap();
        assert_eq!(answer, "partial ans");
    }

    #[tokio::test]
    async fn test_show_tool_calls_prefix() {
        let provider = ScriptedProvider::new(vec![
            call("c1", "echo", json!({"text": "hi"})),
            text("done"),
        ]);
        let executor = AgentExecutor::new(
            provider,
            registry(),
            ExecutorConfig {
                show_tool_calls: true,
                ..config()
            },
        )
        .with_event_handler(Arc::new(ToolCallLogger::new("tester")));

        let answer = executor.run("go".to_string(), &mut Context::new()).await.unwrap();
        assert_eq!(answer, " - Running: echo(text=hi)\n\ndone");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider::new(vec![]);
        let executor = AgentExecutor::new(provider, registry(), config());
        let err = executor.run("go".to_string(), &mut Context::new()).await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }

    #[tokio::test]
    async fn test_no_tools_sent_when_registry_empty() {
        let provider = ScriptedProvider::new(vec![text("essay")]);
        let executor = AgentExecutor::new(provider.clone(), Arc::new(ToolRegistry::new()), config());
        executor.run("write".to_string(), &mut Context::new()).await.unwrap();
        assert!(provider.requests()[0].tools.is_none());
    }
}
