//! Struct definitions and serde defaults for sleuth configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for sleuth, deserialized from `config.toml`.
///
/// Fields use serde defaults so sleuth can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default model identifier (e.g. `"gemini-2.5-flash"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Default provider name (e.g., "gemini", "anthropic").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Maximum rounds of tool execution per run.
    #[serde(default)]
    pub max_iterations: Option<usize>,
    /// Seconds to wait for a single model call.
    #[serde(default)]
    pub model_timeout_secs: Option<u64>,
    /// Seconds to wait for a single tool call.
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Settings for the research tools.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Returns the default model identifier.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization.
pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

/// Provider-specific configuration map.
///
/// Each field corresponds to a supported LLM provider. Only providers
/// the user has configured will be `Some`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub gemini: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub openai: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL for the provider's API (used by Ollama).
    pub base_url: Option<String>,
    /// Model identifier to use with this provider, overriding the global default.
    pub model: Option<String>,
}

/// Configuration for the built-in research tools.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ToolsConfig {
    /// Directory `save_text_to_file` writes into. Defaults to the working directory.
    pub output_dir: Option<String>,
    /// Maximum web search results returned per query.
    pub search_max_results: Option<usize>,
    /// Number of Wikipedia pages summarised per lookup.
    pub wiki_top_k: Option<usize>,
    /// Maximum characters kept from each Wikipedia summary.
    pub wiki_max_chars: Option<usize>,
    /// Wikipedia language edition (e.g. `"en"`, `"ja"`).
    pub wiki_language: Option<String>,
    /// Timeout for HTTP requests made by tools.
    pub http_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            default_provider: None,
            max_iterations: None,
            model_timeout_secs: None,
            tool_timeout_secs: None,
            provider: ProviderConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}
