//! Model provider lookup by kind

use hive_core::{Error, Result};
use hive_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Hosted model families an agent can run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Groq (OpenAI-compatible API)
    Groq,
    /// Google Gemini
    Gemini,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(Error::Configuration(format!("Unknown model provider: {other}"))),
        }
    }
}

/// One shared provider per kind
///
/// Providers hold an HTTP client each, so every agent on the same kind
/// shares one connection pool.
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: HashMap<ProviderKind, Arc<dyn LLMProvider>>,
}

impl ProviderSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the provider for `kind`
    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn LLMProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Provider for `kind`
    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn LLMProvider>> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            Error::Configuration(format!("No model provider configured for {kind}"))
        })
    }

    /// Whether a provider for `kind` is present
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.providers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ProviderSet").field("providers", &kinds).finish()
    }
}
