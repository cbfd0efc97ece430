//! Encyclopedia lookup tool backed by the Wikipedia MediaWiki API.
//!
//! A lookup is two requests: a title search, then a plain-text intro
//! extract for each of the top `top_k` titles.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::{Tool, ToolOutput};

/// Returned when the title search finds nothing usable.
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

pub struct WikiSearchTool {
    http: reqwest::Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
}

impl WikiSearchTool {
    pub fn new(http: reqwest::Client, language: &str, top_k: usize, max_chars: usize) -> Self {
        Self {
            http,
            api_url: format!("https://{}.wikipedia.org/w/api.php", language),
            top_k: top_k.max(1),
            max_chars,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{}", self.api_url, query);
        tracing::debug!(%url, "wikipedia request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Wikipedia request failed")?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Wikipedia returned HTTP {}", status);
        }
        response
            .json::<T>()
            .await
            .context("Failed to decode Wikipedia response")
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k.to_string();
        let resp: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .await?;
        Ok(titles_from(resp, self.top_k))
    }

    async fn summary(&self, title: &str) -> Result<Option<String>> {
        let resp: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .await?;
        Ok(extract_from(resp))
    }
}

#[derive(Deserialize)]
struct WikiInput {
    query: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

fn titles_from(resp: SearchResponse, top_k: usize) -> Vec<String> {
    resp.query
        .map(|q| q.search.into_iter().map(|e| e.title).take(top_k).collect())
        .unwrap_or_default()
}

fn extract_from(resp: ExtractResponse) -> Option<String> {
    resp.query?
        .pages
        .into_values()
        .filter_map(|p| p.extract)
        .map(|e| e.trim().to_string())
        .find(|e| !e.is_empty())
}

/// Render one page block, truncating the summary to `max_chars` characters.
fn format_page(title: &str, summary: &str, max_chars: usize) -> String {
    let summary: String = summary.chars().take(max_chars).collect();
    format!("Page: {}\nSummary: {}", title, summary)
}

#[async_trait::async_trait]
impl Tool for WikiSearchTool {
    fn name(&self) -> &str {
        "wiki_search"
    }

    fn description(&self) -> &str {
        "Look up a topic on Wikipedia. Returns the page title and a summary of the article."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Topic to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let input: WikiInput = serde_json::from_value(input)?;
        let query = input.query.trim();
        if query.is_empty() {
            return Ok(ToolOutput::error("Wikipedia query is empty".into()));
        }

        let titles = self.search_titles(query).await?;
        let mut pages = Vec::new();
        for title in &titles {
            if let Some(summary) = self.summary(title).await? {
                pages.push(format_page(title, &summary, self.max_chars));
            }
        }

        if pages.is_empty() {
            return Ok(ToolOutput::success(NO_RESULT.to_string()));
        }
        Ok(ToolOutput::success(pages.join("\n\n")))
    }
}
