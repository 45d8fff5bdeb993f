//! Builds the agent tree described by a catalogue

use crate::catalog::{AgentDefinition, Catalog, ToolSpec};
use anyhow::{Context as _, Result, anyhow};
use hive_core::Agent;
use hive_finance::{FinanceConfig, FinanceToolkit};
use hive_runtime::{MemberAgent, ProviderSet, TeamAgent};
use hive_tools::{Tool, WebSearchTool};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Turns a validated [`Catalog`] into the root agent
///
/// Agents are built members first, and an agent listed in several teams is
/// built once and shared. The web search tool and the finance toolkit are
/// created on first use and shared by every agent that needs them.
pub struct HierarchyBuilder {
    catalog: Catalog,
    providers: ProviderSet,
    finance_config: FinanceConfig,
    max_iterations: Option<usize>,
    web_search: Option<Arc<dyn Tool>>,
    finance: Option<Arc<FinanceToolkit>>,
}

impl HierarchyBuilder {
    pub fn new(catalog: Catalog, providers: ProviderSet) -> Self {
        Self {
            catalog,
            providers,
            finance_config: FinanceConfig::default(),
            max_iterations: None,
            web_search: None,
            finance: None,
        }
    }

    pub fn finance_config(mut self, config: FinanceConfig) -> Self {
        self.finance_config = config;
        self
    }

    /// Loop bound applied to every agent
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Use this tool for `web_search` instead of the DuckDuckGo default
    pub fn web_search_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.web_search = Some(tool);
        self
    }

    pub fn finance_toolkit(mut self, toolkit: Arc<FinanceToolkit>) -> Self {
        self.finance = Some(toolkit);
        self
    }

    /// Build every agent reachable from the root and return the root
    pub fn build(mut self) -> Result<Arc<dyn Agent>> {
        let order = self.catalog.build_order()?;
        let mut built: HashMap<String, Arc<dyn Agent>> = HashMap::new();

        for name in &order {
            let definition = self
                .catalog
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("agent '{name}' disappeared from the catalogue"))?;
            let agent = self
                .build_agent(&definition, &built)
                .with_context(|| format!("failed to build agent '{name}'"))?;
            info!(
                agent = %name,
                team = definition.is_team(),
                provider = %definition.model.provider,
                model = %definition.model.id,
                tools = definition.tools.len(),
                "Agent ready"
            );
            built.insert(name.clone(), agent);
        }

        built
            .remove(&self.catalog.root)
            .ok_or_else(|| anyhow!("root agent '{}' was not built", self.catalog.root))
    }

    fn build_agent(
        &mut self,
        definition: &AgentDefinition,
        built: &HashMap<String, Arc<dyn Agent>>,
    ) -> Result<Arc<dyn Agent>> {
        let provider = self.providers.get(definition.model.provider)?;
        let tools = self.tools_for(definition)?;

        if !definition.is_team() {
            let mut builder = MemberAgent::builder(&definition.name)
                .role(&definition.role)
                .instructions(definition.instructions.iter().cloned())
                .provider(provider)
                .model(&definition.model.id)
                .tools(tools)
                .show_tool_calls(definition.show_tool_calls);
            if let Some(max_iterations) = self.max_iterations {
                builder = builder.max_iterations(max_iterations);
            }
            return Ok(Arc::new(builder.build()?));
        }

        let mut builder = TeamAgent::builder(&definition.name)
            .role(&definition.role)
            .instructions(definition.instructions.iter().cloned())
            .provider(provider)
            .model(&definition.model.id)
            .tools(tools)
            .show_tool_calls(definition.show_tool_calls);
        if let Some(max_iterations) = self.max_iterations {
            builder = builder.max_iterations(max_iterations);
        }
        for member in &definition.team {
            let agent = built
                .get(member)
                .ok_or_else(|| anyhow!("member '{member}' must be built before its team"))?;
            builder = builder.add_member(Arc::clone(agent));
        }
        Ok(Arc::new(builder.build()?))
    }

    fn tools_for(&mut self, definition: &AgentDefinition) -> Result<Vec<Arc<dyn Tool>>> {
        let mut tools = Vec::new();
        for spec in &definition.tools {
            match spec {
                ToolSpec::WebSearch => tools.push(self.web_search()?),
                ToolSpec::Finance(selection) => {
                    tools.extend(self.finance()?.tools(*selection));
                }
            }
        }
        Ok(tools)
    }

    fn web_search(&mut self) -> Result<Arc<dyn Tool>> {
        if let Some(tool) = &self.web_search {
            return Ok(Arc::clone(tool));
        }
        let tool: Arc<dyn Tool> = Arc::new(WebSearchTool::new()?);
        self.web_search = Some(Arc::clone(&tool));
        Ok(tool)
    }

    fn finance(&mut self) -> Result<Arc<FinanceToolkit>> {
        if let Some(toolkit) = &self.finance {
            return Ok(Arc::clone(toolkit));
        }
        let toolkit = Arc::new(FinanceToolkit::new(&self.finance_config)?);
        self.finance = Some(Arc::clone(&toolkit));
        Ok(toolkit)
    }
}
