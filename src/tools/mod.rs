pub mod rig_adapter;
pub mod save_file;
pub mod search;
pub mod wiki;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ToolsConfig;
use save_file::SaveTextTool;
use search::WebSearchTool;
use wiki::WikiSearchTool;

/// The result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Definition sent to the LLM so it knows what tools are available.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the LLM uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description for the LLM's task prompt.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolOutput>;
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup; lookups return the first match.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Produce definitions for the LLM (names, descriptions, schemas).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Look up a tool by name and execute it.
    #[cfg(test)]
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(input).await
    }

    /// How many tools are registered.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Converts all registered tools into rig-core [`ToolDyn`] trait objects.
    ///
    /// Returns a fresh `Vec` each call so the result can be moved into an
    /// agent builder's `.tools()` without borrow/move conflicts.
    pub fn to_rig_tools(&self) -> Vec<Box<dyn rig::tool::ToolDyn>> {
        self.tools
            .iter()
            .map(|t| {
                Box::new(rig_adapter::RigToolAdapter::new(Arc::clone(t)))
                    as Box<dyn rig::tool::ToolDyn>
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a registry with the three research tools.
    ///
    /// The network tools share one HTTP client carrying the configured
    /// user agent and timeout.
    pub fn with_builtins(config: &ToolsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::constants::USER_AGENT)
            .timeout(Duration::from_secs(config.http_timeout_secs()))
            .build()
            .context("Failed to build HTTP client for tools")?;

        let mut registry = Self::new();
        registry.register(Box::new(WebSearchTool::new(
            http.clone(),
            config.search_max_results(),
        )));
        registry.register(Box::new(WikiSearchTool::new(
            http,
            config.wiki_language(),
            config.wiki_top_k(),
            config.wiki_max_chars(),
        )));
        registry.register(Box::new(SaveTextTool::new(config.output_dir())));
        Ok(registry)
    }
}

#[cfg(test)]
mod tests;
