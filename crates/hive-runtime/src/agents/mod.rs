//! Concrete agent implementations
//!
//! - MemberAgent: a model with a role, instructions and its own tools
//! - TeamAgent: a leader model that delegates to members through transfer tools
//! - DelegateTool: the transfer tool itself

pub mod delegate;
pub mod member;
pub mod team;

pub use delegate::{DEFAULT_MAX_DEPTH, DelegateTool, TaskTransfer, transfer_tool_name};
pub use member::{MemberAgent, MemberAgentBuilder};
pub use team::{TeamAgent, TeamAgentBuilder};
