//! Service configuration from the environment
//!
//! | variable                  | default      |
//! |---------------------------|--------------|
//! | `GOOGLE_API_KEY`          | required     |
//! | `GROQ_API_KEY`            | required     |
//! | `GEMINI_API_BASE`         | Google API   |
//! | `GROQ_API_BASE`           | Groq API     |
//! | `HIVE_HOST`               | `127.0.0.1`  |
//! | `HIVE_PORT`               | `5000`       |
//! | `HIVE_AGENTS_FILE`        | built-in     |
//! | `HIVE_LOG_FORMAT`         | `text`       |
//! | `HIVE_MAX_ITERATIONS`     | `10`         |
//! | `HIVE_YAHOO_RPM`          | `60`         |

use anyhow::{Context as _, Result};
use hive_finance::FinanceConfig;
use hive_llm::providers::{GeminiConfig, GeminiProvider, OpenAICompatConfig, OpenAICompatProvider};
use hive_runtime::{ProviderKind, ProviderSet};
use hive_utils::{EnvError, LogFormat};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Everything the service needs to start
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    pub agents_file: Option<PathBuf>,
    pub log_format: LogFormat,
    pub max_iterations: usize,
    pub groq: OpenAICompatConfig,
    pub gemini: GeminiConfig,
    pub finance: FinanceConfig,
}

impl ServiceConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(hive_utils::optional_env)
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| EnvError::Missing(name.to_string()))
        };

        let google_key = require("GOOGLE_API_KEY")?;
        let groq_key = require("GROQ_API_KEY")?;

        let mut groq = OpenAICompatConfig::groq(groq_key);
        if let Some(base) = lookup("GROQ_API_BASE") {
            groq = groq.with_api_base(base);
        }
        let mut gemini = GeminiConfig::new(google_key);
        if let Some(base) = lookup("GEMINI_API_BASE") {
            gemini = gemini.with_api_base(base);
        }

        let max_iterations = parse_or(&lookup, "HIVE_MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS)?;
        anyhow::ensure!(max_iterations > 0, "HIVE_MAX_ITERATIONS must be at least 1");

        let finance = FinanceConfig::builder()
            .yahoo_requests_per_minute(parse_or(&lookup, "HIVE_YAHOO_RPM", 60)?)
            .build()
            .context("invalid finance configuration")?;

        Ok(Self {
            host: parse_or(&lookup, "HIVE_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or(&lookup, "HIVE_PORT", DEFAULT_PORT)?,
            agents_file: lookup("HIVE_AGENTS_FILE").map(PathBuf::from),
            log_format: parse_or(&lookup, "HIVE_LOG_FORMAT", LogFormat::Text)?,
            max_iterations,
            groq,
            gemini,
            finance,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// One provider per model family, built from the configured keys
    pub fn providers(&self) -> Result<ProviderSet> {
        let groq = OpenAICompatProvider::with_config(self.groq.clone())
            .context("failed to create Groq provider")?;
        let gemini = GeminiProvider::with_config(self.gemini.clone())
            .context("failed to create Gemini provider")?;
        Ok(ProviderSet::new()
            .with_provider(ProviderKind::Groq, Arc::new(groq))
            .with_provider(ProviderKind::Gemini, Arc::new(gemini)))
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> std::result::Result<T, EnvError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| EnvError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const KEYS: [(&str, &str); 2] = [("GOOGLE_API_KEY", "g-key"), ("GROQ_API_KEY", "q-key")];

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&KEYS)).unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.agents_file.is_none());
        assert_eq!(config.groq.api_key, "q-key");
        assert_eq!(config.groq.api_base, hive_llm::providers::openai_compat::GROQ_API_BASE);
        assert_eq!(config.gemini.api_key, "g-key");
        assert_eq!(config.finance.yahoo_requests_per_minute, 60);
    }

    #[test]
    fn test_missing_google_key() {
        let err = ServiceConfig::from_lookup(lookup(&[("GROQ_API_KEY", "q")])).unwrap_err();
        assert_eq!(err.to_string(), "GOOGLE_API_KEY environment variable not set");
    }

    #[test]
    fn test_missing_groq_key() {
        let err = ServiceConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "g"),
            ("GROQ_API_KEY", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "GROQ_API_KEY environment variable not set");
    }

    #[test]
    fn test_overrides() {
        let mut vars = KEYS.to_vec();
        vars.extend([
            ("HIVE_HOST", "0.0.0.0"),
            ("HIVE_PORT", "8080"),
            ("HIVE_AGENTS_FILE", "/etc/hive/agents.toml"),
            ("HIVE_LOG_FORMAT", "json"),
            ("HIVE_MAX_ITERATIONS", "4"),
            ("GROQ_API_BASE", "http://localhost:9000/v1"),
        ]);
        let config = ServiceConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.agents_file, Some(PathBuf::from("/etc/hive/agents.toml")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.groq.api_base, "http://localhost:9000/v1");
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = KEYS.to_vec();
        vars.push(("HIVE_PORT", "http"));
        let err = ServiceConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().starts_with("invalid value for HIVE_PORT"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut vars = KEYS.to_vec();
        vars.push(("HIVE_MAX_ITERATIONS", "0"));
        assert!(ServiceConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_providers_built() {
        let providers = ServiceConfig::from_lookup(lookup(&KEYS))
            .unwrap()
            .providers()
            .unwrap();
        assert!(providers.contains(ProviderKind::Groq));
        assert!(providers.contains(ProviderKind::Gemini));
    }
}
