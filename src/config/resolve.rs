//! Environment variable substitution, API key resolution, and defaulted accessors.

use std::path::PathBuf;
use std::time::Duration;

use super::types::{Config, ProviderEntry, ToolsConfig};

use crate::constants::{
    HTTP_TIMEOUT_SECS, MAX_AGENT_ITERATIONS, MODEL_TIMEOUT_SECS, SEARCH_MAX_RESULTS,
    TOOL_TIMEOUT_SECS, WIKI_LANGUAGE, WIKI_MAX_CHARS, WIKI_TOP_K,
};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = resolve_str(&self.model);
        if let Some(ref mut dp) = self.default_provider {
            *dp = resolve_str(dp);
        }
        if let Some(ref mut dir) = self.tools.output_dir {
            *dir = resolve_str(dir);
        }
        resolve_provider_entry(&mut self.provider.gemini);
        resolve_provider_entry(&mut self.provider.anthropic);
        resolve_provider_entry(&mut self.provider.openai);
        resolve_provider_entry(&mut self.provider.openrouter);
        resolve_provider_entry(&mut self.provider.ollama);
    }

    /// Resolve API key for a provider: env var first, then config value.
    ///
    /// Gemini also accepts `GOOGLE_API_KEY`. Empty values count as unset.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        let mut env_keys = vec![format!("{}_API_KEY", provider.to_uppercase())];
        if provider == "gemini" {
            env_keys.push("GOOGLE_API_KEY".to_string());
        }
        for env_key in &env_keys {
            if let Ok(val) = std::env::var(env_key) {
                if !val.is_empty() {
                    return Some(val);
                }
            }
        }

        self.provider_entry(provider)
            .and_then(|e| e.api_key.clone())
            .filter(|k| !k.is_empty())
    }

    /// Looks up the configured entry for a provider name.
    pub fn provider_entry(&self, provider: &str) -> Option<&ProviderEntry> {
        let entry = match provider {
            "gemini" => &self.provider.gemini,
            "anthropic" => &self.provider.anthropic,
            "openai" => &self.provider.openai,
            "openrouter" => &self.provider.openrouter,
            "ollama" => &self.provider.ollama,
            _ => &None,
        };
        entry.as_ref()
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref().filter(|p| !p.is_empty())
    }

    /// The configured model string as written, possibly in `provider/model` form.
    /// Returns None if the model is the compile-time default (meaning user hasn't configured it).
    pub fn model_name(&self) -> Option<&str> {
        let m = self.model.as_str();
        if m == crate::constants::DEFAULT_MODEL || m.is_empty() {
            return None;
        }
        Some(m)
    }

    /// Maximum rounds of tool execution, never below 1.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(MAX_AGENT_ITERATIONS).max(1)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs.unwrap_or(MODEL_TIMEOUT_SECS))
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs.unwrap_or(TOOL_TIMEOUT_SECS))
    }
}

impl ToolsConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn search_max_results(&self) -> usize {
        self.search_max_results.unwrap_or(SEARCH_MAX_RESULTS)
    }

    pub fn wiki_top_k(&self) -> usize {
        self.wiki_top_k.unwrap_or(WIKI_TOP_K)
    }

    pub fn wiki_max_chars(&self) -> usize {
        self.wiki_max_chars.unwrap_or(WIKI_MAX_CHARS)
    }

    pub fn wiki_language(&self) -> &str {
        self.wiki_language.as_deref().unwrap_or(WIKI_LANGUAGE)
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.http_timeout_secs.unwrap_or(HTTP_TIMEOUT_SECS)
    }
}

/// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
    if let Some(ref mut e) = entry {
        if let Some(ref mut key) = e.api_key {
            *key = resolve_str(key);
        }
        if let Some(ref mut url) = e.base_url {
            *url = resolve_str(url);
        }
    }
}

/// Replace {env:VAR} with the environment variable value.
///
/// Substituted values are not scanned again.
fn resolve_str(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("{env:") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 5..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_str_substitutes_env() {
        std::env::set_var("SLEUTH_TEST_RESOLVE_VAR", "abc");
        assert_eq!(resolve_str("key-{env:SLEUTH_TEST_RESOLVE_VAR}-x"), "key-abc-x");
        assert_eq!(resolve_str("{env:SLEUTH_TEST_SURELY_UNSET_VAR}"), "");
        assert_eq!(resolve_str("{env:UNTERMINATED"), "{env:UNTERMINATED");
    }

    #[test]
    fn test_resolve_str_does_not_rescan_values() {
        std::env::set_var("SLEUTH_TEST_SELF_REF", "{env:SLEUTH_TEST_SELF_REF}");
        assert_eq!(
            resolve_str("a-{env:SLEUTH_TEST_SELF_REF}-{env:SLEUTH_TEST_SURELY_UNSET_VAR}b"),
            "a-{env:SLEUTH_TEST_SELF_REF}-b"
        );
    }

    #[test]
    fn test_config_key_used_when_env_missing() {
        let mut config = Config::default();
        config.provider.openrouter = Some(ProviderEntry {
            api_key: Some("from-config".into()),
            ..ProviderEntry::default()
        });
        // OPENROUTER_API_KEY is not expected in the test environment.
        if std::env::var("OPENROUTER_API_KEY").is_err() {
            assert_eq!(
                config.resolve_api_key("openrouter").as_deref(),
                Some("from-config")
            );
        }
        config.provider.openrouter = Some(ProviderEntry {
            api_key: Some(String::new()),
            ..ProviderEntry::default()
        });
        if std::env::var("OPENROUTER_API_KEY").is_err() {
            assert!(config.resolve_api_key("openrouter").is_none());
        }
    }

    #[test]
    fn test_defaulted_accessors() {
        let mut config = Config::default();
        assert_eq!(config.max_iterations(), MAX_AGENT_ITERATIONS);
        config.max_iterations = Some(0);
        assert_eq!(config.max_iterations(), 1);
        assert_eq!(config.tools.output_dir(), PathBuf::from("."));
        assert_eq!(config.tools.wiki_language(), "en");
        assert!(config.model_name().is_none());
        config.model = "openai/gpt-4.1".into();
        assert_eq!(config.model_name(), Some("openai/gpt-4.1"));
    }
}
