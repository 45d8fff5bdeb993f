//! Name-indexed set of tools owned by one agent

use crate::Tool;
use hive_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The tools one agent may call
///
/// Filled while the agent is built, then shared read-only. Iteration is by
/// name so the model sees the same tool order on every request.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool`; a second tool with the same name is rejected
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(Error::Configuration(format!("Tool '{name}' is already registered")));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tools.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Stub(&'static str);

    #[async_trait]
    impl Tool for Stub {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(json!({"called": self.0, "with": params}))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "stub"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn finance_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for name in ["get_stock_fundamentals", "get_company_info", "get_current_stock_price"] {
            registry.register(Arc::new(Stub(name))).unwrap();
        }
        registry
    }

    #[test]
    fn test_lookup() {
        let registry = finance_registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.get("get_company_info").is_some());
        assert!(registry.get("web_search").is_none());
        assert!(ToolRegistry::new().is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = finance_registry();
        let err = registry
            .register(Arc::new(Stub("get_company_info")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Tool 'get_company_info' is already registered"
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_sorted_by_name() {
        let registry = finance_registry();
        let listed: Vec<String> = registry
            .list_tools()
            .iter()
            .map(|tool| tool.name().to_string())
            .collect();
        assert_eq!(
            listed,
            ["get_company_info", "get_current_stock_price", "get_stock_fundamentals"]
        );
        assert_eq!(registry.names(), listed);
        assert_eq!(
            format!("{registry:?}"),
            r#"["get_company_info", "get_current_stock_price", "get_stock_fundamentals"]"#
        );
    }

    #[tokio::test]
    async fn test_dispatch() {
        let registry = finance_registry();
        let tool = registry.get("get_current_stock_price").unwrap();
        let out = tool.execute(json!({"symbol": "NVDA"})).await.unwrap();
        assert_eq!(out["with"]["symbol"], "NVDA");
    }
}
