//! Delegation as a tool call
//!
//! A team leader hands work to a member by calling that member's transfer
//! tool. The tool runs the member agent with a message composed from the
//! call's arguments and returns the member's answer as the tool result.

use async_trait::async_trait;
use hive_core::{Agent, Context, Error, Result};
use hive_llm::tools::schema;
use hive_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Default bound on nested delegations within one request
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Name of the tool a leader uses to reach `member`
///
/// `"Web Agent"` becomes `transfer_task_to_web_agent`.
pub fn transfer_tool_name(member: &str) -> String {
    let mut snake = String::with_capacity(member.len());
    for c in member.trim().chars() {
        if c.is_ascii_alphanumeric() {
            snake.push(c.to_ascii_lowercase());
        } else if !snake.ends_with('_') && !snake.is_empty() {
            snake.push('_');
        }
    }
    let snake = snake.trim_end_matches('_');
    format!("transfer_task_to_{snake}")
}

/// Arguments a leader passes to a transfer tool
#[derive(Debug, Clone, Deserialize)]
pub struct TaskTransfer {
    pub task_description: String,
    pub expected_output: String,
    #[serde(default)]
    pub additional_information: Option<String>,
}

impl TaskTransfer {
    /// The message the member agent receives
    pub fn compose(&self) -> String {
        let mut message = format!(
            "{}\n\n<expected_output>\n{}\n</expected_output>",
            self.task_description.trim(),
            self.expected_output.trim()
        );
        if let Some(info) = self
            .additional_information
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            message.push_str(&format!(
                "\n\n<additional_information>\n{info}\n</additional_information>"
            ));
        }
        message
    }
}

/// Tool that runs a member agent on behalf of a leader
pub struct DelegateTool {
    leader: String,
    member: Arc<dyn Agent>,
    tool_name: String,
    description: String,
    max_depth: usize,
}

impl DelegateTool {
    pub fn new(leader: impl Into<String>, member: Arc<dyn Agent>) -> Self {
        let tool_name = transfer_tool_name(member.name());
        let description = if member.role().is_empty() {
            format!("Use this function to transfer a task to {}.", member.name())
        } else {
            format!(
                "Use this function to transfer a task to {}. Role: {}",
                member.name(),
                member.role()
            )
        };
        Self {
            leader: leader.into(),
            member,
            tool_name,
            description,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn member(&self) -> &Arc<dyn Agent> {
        &self.member
    }
}

#[async_trait]
impl Tool for DelegateTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        self.execute_with_context(params, &mut Context::new()).await
    }

    async fn execute_with_context(&self, params: Value, context: &mut Context) -> Result<Value> {
        let transfer: TaskTransfer = serde_json::from_value(params).map_err(|e| {
            Error::ProcessingFailed(format!("Invalid arguments for {}: {e}", self.tool_name))
        })?;

        if context.delegation_depth() >= self.max_depth {
            return Err(Error::ProcessingFailed(format!(
                "Delegation depth limit ({}) reached at {}",
                self.max_depth,
                context.delegation_path().join(" -> ")
            )));
        }

        let depth = context.enter_delegation(&self.leader);
        info!(
            leader = %self.leader,
            member = %self.member.name(),
            depth,
            "Transferring task"
        );

        let outcome = self.member.process(transfer.compose(), context).await;
        context.exit_delegation();

        Ok(Value::String(outcome?))
    }

    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "task_description": schema::string("A clear and concise description of the task the member should achieve."),
                "expected_output": schema::string("The expected output from the member."),
                "additional_information": schema::string("Any additional information that may help the member complete the task."),
            }),
            &["task_description", "expected_output"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the input and the depth it was called at
    struct Recorder {
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl Agent for Recorder {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((input, context.delegation_depth()));
            Ok("member answer".to_string())
        }

        fn name(&self) -> &str {
            "Web Agent"
        }

        fn role(&self) -> &str {
            "search the web for information"
        }
    }

    fn recorder() -> Arc<Recorder> {
        Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_transfer_tool_name() {
        assert_eq!(transfer_tool_name("Web Agent"), "transfer_task_to_web_agent");
        assert_eq!(transfer_tool_name("  Finance  Team "), "transfer_task_to_finance_team");
        assert_eq!(transfer_tool_name("R&D-Agent!"), "transfer_task_to_r_d_agent");
    }

    #[test]
    fn test_compose() {
        let transfer = TaskTransfer {
            task_description: "Find NVDA news".to_string(),
            expected_output: "Bullet list".to_string(),
            additional_information: Some("  ".to_string()),
        };
        assert_eq!(
            transfer.compose(),
            "Find NVDA news\n\n<expected_output>\nBullet list\n</expected_output>"
        );

        let transfer = TaskTransfer {
            additional_information: Some("Last week only".to_string()),
            ..transfer
        };
        assert!(transfer.compose().ends_with(
            "<additional_information>\nLast week only\n</additional_information>"
        ));
    }

    #[test]
    fn test_tool_metadata() {
        let tool = DelegateTool::new("Agent Team", recorder());
        assert_eq!(tool.name(), "transfer_task_to_web_agent");
        assert!(tool.description().contains("search the web for information"));
        let schema = tool.input_schema();
        assert_eq!(schema["required"], json!(["task_description", "expected_output"]));
        assert!(schema["properties"]["additional_information"].is_object());
    }

    #[tokio::test]
    async fn test_runs_member_one_level_down() {
        let member = recorder();
        let tool = DelegateTool::new("Agent Team", member.clone());
        let mut context = Context::new();

        let result = tool
            .execute_with_context(
                json!({"task_description": "Search", "expected_output": "Links"}),
                &mut context,
            )
            .await
            .unwrap();

        assert_eq!(result, json!("member answer"));
        let seen = member.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.starts_with("Search"));
        assert_eq!(seen[0].1, 1);
        assert_eq!(context.delegation_depth(), 0);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let member = recorder();
        let tool = DelegateTool::new("Agent Team", member.clone()).with_max_depth(1);
        let mut context = Context::new();
        context.enter_delegation("Autonomous Orchestrator");

        let err = tool
            .execute_with_context(
                json!({"task_description": "Search", "expected_output": "Links"}),
                &mut context,
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Delegation depth limit (1)"));
        assert!(member.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let tool = DelegateTool::new("Agent Team", recorder());
        let err = tool
            .execute(json!({"task_description": "Search"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid arguments for transfer_task_to_web_agent"));
    }
}
