//! Member agent: one model, one role, its own tools

use crate::executor::{AgentExecutor, ExecutorConfig, ToolCallLogger};
use crate::prompt::SystemPrompt;
use async_trait::async_trait;
use hive_core::{Agent, Context, Error, Result};
use hive_llm::LLMProvider;
use hive_tools::{Tool, ToolRegistry};
use std::sync::Arc;
use tracing::{info, instrument};

/// An agent that answers with its own model and tools
///
/// # Example
///
/// ```no_run
/// use hive_runtime::MemberAgent;
/// use hive_tools::WebSearchTool;
/// use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn hive_llm::LLMProvider>) -> hive_core::Result<()> {
/// let agent = MemberAgent::builder("Web Agent")
///     .role("search the web for information")
///     .instructions(["Always include the sources"])
///     .provider(provider)
///     .model("qwen-2.5-32b")
///     .tool(Arc::new(WebSearchTool::new()?))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct MemberAgent {
    name: String,
    role: String,
    executor: AgentExecutor,
}

impl MemberAgent {
    pub fn builder(name: impl Into<String>) -> MemberAgentBuilder {
        MemberAgentBuilder::new(name)
    }

    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for MemberAgent {
    #[instrument(skip_all, fields(agent = %self.name))]
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        info!(input_length = input.len(), "Agent processing input");
        self.executor.run(input, context).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> &str {
        &self.role
    }
}

/// Builder for [`MemberAgent`]
pub struct MemberAgentBuilder {
    pub(crate) name: String,
    pub(crate) role: String,
    pub(crate) instructions: Vec<String>,
    pub(crate) provider: Option<Arc<dyn LLMProvider>>,
    pub(crate) tools: Vec<Arc<dyn Tool>>,
    pub(crate) config: ExecutorConfig,
}

impl MemberAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: String::new(),
            instructions: Vec::new(),
            provider: None,
            tools: Vec::new(),
            config: ExecutorConfig::default(),
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions
            .extend(instructions.into_iter().map(Into::into));
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn show_tool_calls(mut self, show: bool) -> Self {
        self.config.show_tool_calls = show;
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> Result<MemberAgent> {
        let prompt = SystemPrompt::new()
            .role(self.role.clone())
            .instructions(self.instructions.clone());
        let (name, role, executor) = self.into_parts(prompt)?;
        Ok(MemberAgent {
            name,
            role,
            executor,
        })
    }

    /// Validate and assemble the executor shared by member and team agents
    pub(crate) fn into_parts(
        self,
        prompt: SystemPrompt,
    ) -> Result<(String, String, AgentExecutor)> {
        if self.name.trim().is_empty() {
            return Err(Error::Configuration("agent name must not be empty".to_string()));
        }
        let provider = self.provider.ok_or_else(|| {
            Error::Configuration(format!("agent '{}' has no model provider", self.name))
        })?;
        if self.config.model.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "agent '{}' has no model id",
                self.name
            )));
        }
        if self.config.max_iterations == 0 {
            return Err(Error::Configuration(format!(
                "agent '{}' must allow at least one iteration",
                self.name
            )));
        }

        let mut registry = ToolRegistry::new();
        for tool in self.tools {
            registry.register(tool).map_err(|e| {
                Error::Configuration(format!("agent '{}': {e}", self.name))
            })?;
        }

        let config = ExecutorConfig {
            system_prompt: Some(prompt.render()),
            ..self.config
        };
        let show_tool_calls = config.show_tool_calls;
        let mut executor = AgentExecutor::new(provider, Arc::new(registry), config);
        if show_tool_calls {
            executor = executor.with_event_handler(Arc::new(ToolCallLogger::new(self.name.clone())));
        }

        Ok((self.name, self.role, executor))
    }
}
