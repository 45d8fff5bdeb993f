//! Web search tool backed by the DuckDuckGo HTML endpoint
//!
//! No API key is needed. DuckDuckGo occasionally answers automated traffic
//! with a CAPTCHA page; that is reported as a tool error so the model can
//! say the search was unavailable.

use crate::Tool;
use async_trait::async_trait;
use hive_core::{Error, Result};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// DuckDuckGo's JavaScript-free results page
pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

const MAX_RESULTS_LIMIT: usize = 10;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
        .expect("title pattern is valid")
});
static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)
        .expect("snippet pattern is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Configuration for [`WebSearchTool`]
#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    /// Search endpoint
    pub endpoint: String,
    /// User agent sent with each request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Results returned when the caller does not ask for a count
    pub default_max_results: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_string(),
            user_agent: "Mozilla/5.0 (compatible; hive/0.1)".to_string(),
            timeout_secs: 20,
            default_max_results: 5,
        }
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    pub title: String,
    /// Target URL, with DuckDuckGo's redirect removed
    pub url: String,
    /// Result snippet
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct WebSearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

/// `web_search` tool
pub struct WebSearchTool {
    client: Client,
    config: WebSearchConfig,
}

impl WebSearchTool {
    /// Create the tool with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(WebSearchConfig::default())
    }

    /// Create the tool with custom settings
    pub fn with_config(config: WebSearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InitializationFailed(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::ProcessingFailed(format!("Search request failed: {e}")))?;

        let status = response.status();
        let html = response
            .text()
            .await
            .map_err(|e| Error::ProcessingFailed(format!("Failed to read search page: {e}")))?;

        if is_captcha_page(&html) {
            warn!("DuckDuckGo answered with a CAPTCHA page");
            return Err(Error::ProcessingFailed(
                "Web search is temporarily unavailable: DuckDuckGo blocked the request with a CAPTCHA"
                    .to_string(),
            ));
        }
        if !status.is_success() {
            return Err(Error::ProcessingFailed(format!(
                "Search request failed with HTTP {status}"
            )));
        }

        Ok(extract_results(&html, max_results))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let params: WebSearchParams = serde_json::from_value(params)
            .map_err(|e| Error::ProcessingFailed(format!("Invalid parameters: {e}")))?;

        let query = params.query.trim();
        if query.is_empty() {
            return Err(Error::ProcessingFailed("Search query is empty".to_string()));
        }
        let max_results = params
            .max_results
            .unwrap_or(self.config.default_max_results)
            .clamp(1, MAX_RESULTS_LIMIT);

        info!("Searching the web for '{}'", query);
        let results = self.search(query, max_results).await?;
        debug!("Search returned {} results", results.len());

        Ok(json!({
            "query": query,
            "count": results.len(),
            "results": results,
        }))
    }

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Returns titles, URLs and snippets of the top results. \
         Use the URLs to cite sources."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results to return (1-10, default 5)"
                }
            },
            "required": ["query"]
        })
    }
}

fn is_captcha_page(html: &str) -> bool {
    html.contains("anomaly-modal") || html.contains("Unfortunately, bots")
}

/// Pull results out of a DuckDuckGo HTML results page
fn extract_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for chunk in html.split("result__body").skip(1) {
        if results.len() >= max_results {
            break;
        }
        let Some(caps) = TITLE_RE.captures(chunk) else {
            continue;
        };
        let Some(url) = resolve_result_url(&html_decode(&caps[1])) else {
            // ads point back into duckduckgo.com
            continue;
        };
        let title = clean_text(&caps[2]);
        if title.is_empty() {
            continue;
        }
        let snippet = SNIPPET_RE
            .captures(chunk)
            .map(|c| clean_text(&c[1]))
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
        });
    }

    results
}

/// Unwrap `//duckduckgo.com/l/?uddg=<target>` redirects
fn resolve_result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    let is_ddg = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    if !is_ddg {
        return Some(parsed.to_string());
    }

    parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .and_then(|(_, v)| Url::parse(&v).ok())
        .map(|u| u.to_string())
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, "");
    html_decode(stripped.trim())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
