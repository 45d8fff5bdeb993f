//! Tool descriptions offered to a model, and JSON Schema shorthands for them

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable tool as the model sees it
///
/// Providers translate this into their own wire shape: Groq wants a
/// `function` object, Gemini a `functionDeclarations` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Must equal the name the tool is registered under
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Names of the arguments the model must always supply
    pub fn required_arguments(&self) -> Vec<&str> {
        self.input_schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Shorthands for the handful of schema shapes the tools need
pub mod schema {
    use serde_json::{Value, json};

    /// An arguments object
    ///
    /// ```
    /// use hive_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let args = schema::object(json!({"symbol": schema::string("Ticker, e.g. NVDA")}), &["symbol"]);
    /// assert_eq!(args["required"], json!(["symbol"]));
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({"type": "object", "properties": properties, "required": required})
    }

    pub fn string(description: &str) -> Value {
        typed("string", description)
    }

    pub fn integer(description: &str) -> Value {
        typed("integer", description)
    }

    fn typed(kind: &str, description: &str) -> Value {
        json!({"type": kind, "description": description})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_arguments() {
        let transfer = ToolDefinition::new(
            "transfer_task_to_web_agent",
            "Hand a task to the Web Agent",
            schema::object(
                json!({
                    "task_description": schema::string("What to do"),
                    "expected_output": schema::string("What to return"),
                    "max_results": schema::integer("Result cap"),
                }),
                &["task_description", "expected_output"],
            ),
        );

        assert_eq!(transfer.required_arguments(), ["task_description", "expected_output"]);
        assert_eq!(transfer.input_schema["properties"]["max_results"]["type"], "integer");
    }

    #[test]
    fn test_no_required_arguments() {
        let tool = ToolDefinition::new("ping", "No arguments", json!({"type": "object"}));
        assert!(tool.required_arguments().is_empty());
    }
}
