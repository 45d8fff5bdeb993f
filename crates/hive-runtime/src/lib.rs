//! Agent runtime for hive
//!
//! This crate runs agents: the [`AgentExecutor`] drives the
//! LLM → tool calls → results loop, [`MemberAgent`] wraps one executor with
//! its own tools, and [`TeamAgent`] puts a leader model in front of member
//! agents, which it reaches through `transfer_task_to_<member>` tools.
//! [`ProviderSet`] hands out the model providers agents are built with.

pub mod agents;
pub mod executor;
pub mod prompt;
pub mod providers;

pub use agents::{
    DEFAULT_MAX_DEPTH, DelegateTool, MemberAgent, MemberAgentBuilder, TaskTransfer, TeamAgent,
    TeamAgentBuilder, transfer_tool_name,
};
pub use executor::{
    AgentExecutor, ExecutorConfig, ExecutorEventHandler, ToolCallLogger, format_tool_call,
};
pub use prompt::{MemberSummary, SystemPrompt};
pub use providers::{ProviderKind, ProviderSet};
