//! Team agent: a leader model that delegates to members through tool calls
//!
//! Which member handles a request is decided by the leader model alone. Each
//! member is exposed as a `transfer_task_to_<member>` tool and listed in the
//! leader's system prompt with its role.

use crate::agents::delegate::{DEFAULT_MAX_DEPTH, DelegateTool};
use crate::agents::member::MemberAgentBuilder;
use crate::executor::AgentExecutor;
use crate::prompt::{MemberSummary, SystemPrompt};
use async_trait::async_trait;
use hive_core::{Agent, Context, Error, Result};
use hive_llm::LLMProvider;
use hive_tools::Tool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

/// A leader agent with a roster of member agents
pub struct TeamAgent {
    name: String,
    role: String,
    members: Vec<Arc<dyn Agent>>,
    executor: AgentExecutor,
}

impl TeamAgent {
    pub fn builder(name: impl Into<String>) -> TeamAgentBuilder {
        TeamAgentBuilder::new(name)
    }

    /// Member names in roster order
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for TeamAgent {
    #[instrument(skip_all, fields(team = %self.name))]
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        info!(
            members = self.members.len(),
            depth = context.delegation_depth(),
            "Team leader processing input"
        );
        self.executor.run(input, context).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> &str {
        &self.role
    }
}

/// Builder for [`TeamAgent`]
///
/// Takes the same settings as a member agent for the leader, plus the members.
pub struct TeamAgentBuilder {
    leader: MemberAgentBuilder,
    members: Vec<Arc<dyn Agent>>,
    max_depth: usize,
}

impl TeamAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            leader: MemberAgentBuilder::new(name),
            members: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.leader = self.leader.role(role);
        self
    }

    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leader = self.leader.instructions(instructions);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.leader = self.leader.provider(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.leader = self.leader.model(model);
        self
    }

    /// Give the leader a tool of its own besides the transfer tools
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.leader = self.leader.tool(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.leader = self.leader.tools(tools);
        self
    }

    pub fn show_tool_calls(mut self, show: bool) -> Self {
        self.leader = self.leader.show_tool_calls(show);
        self
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.leader = self.leader.max_iterations(max_iterations);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.leader = self.leader.max_tokens(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.leader = self.leader.temperature(temperature);
        self
    }

    pub fn add_member(mut self, member: Arc<dyn Agent>) -> Self {
        self.members.push(member);
        self
    }

    /// Bound on nested delegations below this team
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> Result<TeamAgent> {
        let Self {
            mut leader,
            members,
            max_depth,
        } = self;

        if members.is_empty() {
            return Err(Error::Configuration(format!(
                "team '{}' has no members",
                leader.name
            )));
        }

        let mut prompt = SystemPrompt::new()
            .role(leader.role.clone())
            .instructions(leader.instructions.clone());
        let mut transfer_names = HashSet::new();

        for member in &members {
            let tool = DelegateTool::new(leader.name.clone(), Arc::clone(member))
                .with_max_depth(max_depth);
            if !transfer_names.insert(tool.name().to_string()) {
                return Err(Error::Configuration(format!(
                    "team '{}' has two members mapping to tool '{}'",
                    leader.name,
                    tool.name()
                )));
            }
            prompt = prompt.member(MemberSummary {
                name: member.name().to_string(),
                role: member.role().to_string(),
                transfer_tool: tool.name().to_string(),
            });
            leader = leader.tool(Arc::new(tool));
        }

        let (name, role, executor) = leader.into_parts(prompt)?;
        Ok(TeamAgent {
            name,
            role,
            members,
            executor,
        })
    }
}
