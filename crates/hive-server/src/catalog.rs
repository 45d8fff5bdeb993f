//! Agent catalogue: the agents the service is built from
//!
//! A catalogue is a list of agent definitions plus the name of the root
//! agent that answers queries. It is read once at start-up from TOML (the
//! built-in file or a user-supplied one) and validated before anything is
//! constructed from it.

use hive_finance::FinanceToolSelection;
use hive_runtime::ProviderKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const BUILTIN: &str = include_str!("../config/agents.toml");

/// Errors from loading or validating a catalogue
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read agents file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid agents file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("agent name must not be empty")]
    EmptyName,

    #[error("agent '{0}' is defined more than once")]
    DuplicateAgent(String),

    #[error("agent '{0}' has an empty model id")]
    EmptyModel(String),

    #[error("root agent '{0}' is not defined")]
    UnknownRoot(String),

    #[error("team '{team}' lists unknown member '{member}'")]
    UnknownMember { team: String, member: String },

    #[error("team cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Which hosted model an agent runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: ProviderKind,
    pub id: String,
}

/// A tool an agent is given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolSpec {
    /// DuckDuckGo search
    WebSearch,
    /// Yahoo Finance tools, each enabled by its own flag
    Finance(FinanceToolSelection),
}

/// One agent in the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub model: ModelRef,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    /// A single string or a list of strings
    #[serde(default, deserialize_with = "one_or_many")]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub show_tool_calls: bool,
    /// Member agent names; non-empty makes this a team
    #[serde(default)]
    pub team: Vec<String>,
}

impl AgentDefinition {
    pub fn is_team(&self) -> bool {
        !self.team.is_empty()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// The full set of agent definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub root: String,
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
}

impl Catalog {
    /// The catalogue shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN)
    }

    /// Parse a catalogue; does not validate
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a catalogue file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Look up an agent by name
    pub fn get(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Definition of the root agent
    pub fn root(&self) -> Result<&AgentDefinition> {
        self.get(&self.root)
            .ok_or_else(|| CatalogError::UnknownRoot(self.root.clone()))
    }

    /// Check the invariants everything built from the catalogue relies on
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !names.insert(agent.name.as_str()) {
                return Err(CatalogError::DuplicateAgent(agent.name.clone()));
            }
            if agent.model.id.trim().is_empty() {
                return Err(CatalogError::EmptyModel(agent.name.clone()));
            }
        }

        for agent in &self.agents {
            if let Some(member) = agent.team.iter().find(|m| !names.contains(m.as_str())) {
                return Err(CatalogError::UnknownMember {
                    team: agent.name.clone(),
                    member: member.clone(),
                });
            }
        }

        self.root()?;

        let by_name: HashMap<&str, &AgentDefinition> =
            self.agents.iter().map(|a| (a.name.as_str(), a)).collect();
        let mut reachable = HashSet::new();
        let mut path = Vec::new();
        visit(&self.root, &by_name, &mut path, &mut reachable)?;

        for agent in &self.agents {
            if !reachable.contains(agent.name.as_str()) {
                debug!(agent = %agent.name, "Agent is not reachable from the root and will not be built");
            }
        }

        Ok(())
    }

    /// Names of agents reachable from the root, members before their teams
    pub fn build_order(&self) -> Result<Vec<String>> {
        self.validate()?;
        let by_name: HashMap<&str, &AgentDefinition> =
            self.agents.iter().map(|a| (a.name.as_str(), a)).collect();
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        post_order(&self.root, &by_name, &mut seen, &mut order);
        Ok(order)
    }
}

/// Depth-first walk that fails on the first back edge
fn visit<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a AgentDefinition>,
    path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<()> {
    if let Some(start) = path.iter().position(|p| *p == name) {
        let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
        cycle.push(name.to_string());
        return Err(CatalogError::Cycle(cycle));
    }
    if done.contains(name) {
        return Ok(());
    }
    let Some(&agent) = by_name.get(name) else {
        return Ok(());
    };

    path.push(name);
    for member in &agent.team {
        visit(member, by_name, path, done)?;
    }
    path.pop();
    done.insert(name);
    Ok(())
}

fn post_order<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a AgentDefinition>,
    seen: &mut HashSet<&'a str>,
    order: &mut Vec<String>,
) {
    if !seen.insert(name) {
        return;
    }
    if let Some(&agent) = by_name.get(name) {
        for member in &agent.team {
            post_order(member, by_name, seen, order);
        }
    }
    order.push(name.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog(source: &str) -> Catalog {
        Catalog::from_toml_str(source).unwrap()
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.root, "Autonomous Orchestrator");
        assert_eq!(catalog.agents.len(), 7);

        let web = catalog.get("Web Agent").unwrap();
        assert_eq!(web.model.provider, ProviderKind::Groq);
        assert_eq!(web.model.id, "qwen-2.5-32b");
        assert_eq!(web.tools, vec![ToolSpec::WebSearch]);
        assert_eq!(web.instructions, vec!["Always include the sources"]);
        assert!(web.show_tool_calls);
        assert!(!web.is_team());

        let finance = catalog.get("Finance Agent").unwrap();
        assert_eq!(finance.model.provider, ProviderKind::Gemini);
        assert_eq!(finance.tools, vec![ToolSpec::Finance(FinanceToolSelection::all())]);

        let team = catalog.get("Agent Team").unwrap();
        assert_eq!(team.team, vec!["Web Agent", "Finance Agent", "Essay Agent"]);
        assert_eq!(team.instructions, vec!["Always include sources", "Use tables to display data"]);

        let root = catalog.root().unwrap();
        assert_eq!(root.team, vec!["Agent Team"]);
        assert_eq!(root.model.id, "gemini-2.0-flash");
    }

    #[test]
    fn test_builtin_build_order() {
        let order = Catalog::builtin().unwrap().build_order().unwrap();
        assert_eq!(
            order,
            vec![
                "Web Agent",
                "Finance Agent",
                "Essay Agent",
                "Agent Team",
                "Autonomous Orchestrator"
            ]
        );
    }

    #[test]
    fn test_finance_flags_default_off() {
        let catalog = catalog(
            r#"
            root = "A"
            [[agents]]
            name = "A"
            model = { provider = "gemini", id = "gemini-2.0-flash" }
            tools = [{ kind = "finance", stock_price = true }]
            "#,
        );
        let ToolSpec::Finance(selection) = &catalog.agents[0].tools[0] else {
            panic!("expected finance tools");
        };
        assert!(selection.stock_price);
        assert!(!selection.company_info);
        assert!(catalog.agents[0].instructions.is_empty());
        assert!(catalog.agents[0].role.is_empty());
    }

    #[test]
    fn test_duplicate_names() {
        let err = catalog(
            r#"
            root = "A"
            [[agents]]
            name = "A"
            model = { provider = "groq", id = "m" }
            [[agents]]
            name = "A"
            model = { provider = "groq", id = "m" }
            "#,
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateAgent(name) if name == "A"));
    }

    #[test]
    fn test_unknown_member() {
        let err = catalog(
            r#"
            root = "Team"
            [[agents]]
            name = "Team"
            model = { provider = "groq", id = "m" }
            team = ["Ghost"]
            "#,
        )
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "team 'Team' lists unknown member 'Ghost'");
    }

    #[test]
    fn test_missing_root() {
        let err = catalog(
            r#"
            root = "Nobody"
            [[agents]]
            name = "A"
            model = { provider = "groq", id = "m" }
            "#,
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRoot(_)));
    }

    #[test]
    fn test_cycle() {
        let err = catalog(
            r#"
            root = "A"
            [[agents]]
            name = "A"
            model = { provider = "groq", id = "m" }
            team = ["B"]
            [[agents]]
            name = "B"
            model = { provider = "groq", id = "m" }
            team = ["A"]
            "#,
        )
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "team cycle: A -> B -> A");
    }

    #[test]
    fn test_empty_model_id() {
        let err = catalog(
            r#"
            root = "A"
            [[agents]]
            name = "A"
            model = { provider = "groq", id = " " }
            "#,
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyModel(_)));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Catalog::from_toml_str(
            r#"
            root = "A"
            [[agents]]
            name = "A"
            model = { provider = "openai", id = "gpt" }
            "#,
        );
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            root = "Solo"
            [[agents]]
            name = "Solo"
            model = {{ provider = "groq", id = "qwen-2.5-32b" }}
            "#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.build_order().unwrap(), vec!["Solo"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load("/nonexistent/agents.toml").unwrap_err();
        assert!(err.to_string().starts_with("failed to read agents file /nonexistent/agents.toml"));
    }
}
