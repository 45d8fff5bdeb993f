//! The [`Agent`] trait shared by single agents and teams

use crate::{Context, Result};
use async_trait::async_trait;

/// Anything that can take a text task and answer it
///
/// A team is an `Agent` too, which is what lets a team list another team
/// among its members.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer `input`, possibly by calling tools or other agents
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    fn name(&self) -> &str;

    /// One line describing the agent, shown to team leaders in their roster
    fn role(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Shout;

    #[async_trait]
    impl Agent for Shout {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            Ok(format!("{}:{}", context.delegation_depth(), input.to_uppercase()))
        }

        fn name(&self) -> &str {
            "Shout"
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let agent: Arc<dyn Agent> = Arc::new(Shout);
        assert_eq!(agent.name(), "Shout");
        assert_eq!(agent.role(), "");

        let mut ctx = Context::new();
        ctx.enter_delegation("Agent Team");
        let out = agent.process("nvda".to_string(), &mut ctx).await.unwrap();
        assert_eq!(out, "1:NVDA");
    }
}
