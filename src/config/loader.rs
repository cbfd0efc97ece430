//! File loading and merging for sleuth configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{default_model, Config, ProviderConfig, ProviderEntry, ToolsConfig};

impl Config {
    /// Loads the global config from `~/.config/sleuth/config.toml`.
    ///
    /// If no config file exists, creates one with sensible defaults
    /// (including `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = Self::default_toml();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "wrote default config");
            return Self::parse(&default_toml, &path);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::parse(&contents, &path)
    }

    /// Look for sleuth.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                let contents = fs::read_to_string(&candidate)
                    .with_context(|| format!("Failed to read config from {:?}", candidate))?;
                tracing::debug!(path = %candidate.display(), "loaded project config");
                return Self::parse(&contents, &candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    fn parse(contents: &str, path: &Path) -> Result<Config> {
        toml::from_str(contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// The config file written on first run.
    pub(super) fn default_toml() -> String {
        format!(
            r#"model = "{}"
default_provider = "{}"
max_iterations = {}

[provider.gemini]
api_key = "{{env:GEMINI_API_KEY}}"

[provider.anthropic]
api_key = "{{env:ANTHROPIC_API_KEY}}"

[provider.openai]
api_key = "{{env:OPENAI_API_KEY}}"

[provider.openrouter]
api_key = "{{env:OPENROUTER_API_KEY}}"

[provider.ollama]
base_url = "{}"

[tools]
search_max_results = {}
wiki_top_k = {}
"#,
            default_model(),
            crate::constants::DEFAULT_PROVIDER,
            crate::constants::MAX_AGENT_ITERATIONS,
            crate::constants::OLLAMA_DEFAULT_BASE_URL,
            crate::constants::SEARCH_MAX_RESULTS,
            crate::constants::WIKI_TOP_K,
        )
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            default_provider: project.default_provider.or(global.default_provider),
            max_iterations: project.max_iterations.or(global.max_iterations),
            model_timeout_secs: project.model_timeout_secs.or(global.model_timeout_secs),
            tool_timeout_secs: project.tool_timeout_secs.or(global.tool_timeout_secs),
            provider: ProviderConfig {
                gemini: merge_entry(project.provider.gemini, global.provider.gemini),
                anthropic: merge_entry(project.provider.anthropic, global.provider.anthropic),
                openai: merge_entry(project.provider.openai, global.provider.openai),
                openrouter: merge_entry(project.provider.openrouter, global.provider.openrouter),
                ollama: merge_entry(project.provider.ollama, global.provider.ollama),
            },
            tools: ToolsConfig {
                output_dir: project.tools.output_dir.or(global.tools.output_dir),
                search_max_results: project
                    .tools
                    .search_max_results
                    .or(global.tools.search_max_results),
                wiki_top_k: project.tools.wiki_top_k.or(global.tools.wiki_top_k),
                wiki_max_chars: project.tools.wiki_max_chars.or(global.tools.wiki_max_chars),
                wiki_language: project.tools.wiki_language.or(global.tools.wiki_language),
                http_timeout_secs: project
                    .tools
                    .http_timeout_secs
                    .or(global.tools.http_timeout_secs),
            },
        }
    }
}

/// Field-wise merge of one provider entry; project fields win.
fn merge_entry(project: Option<ProviderEntry>, global: Option<ProviderEntry>) -> Option<ProviderEntry> {
    match (project, global) {
        (Some(p), Some(g)) => Some(ProviderEntry {
            api_key: p.api_key.or(g.api_key),
            base_url: p.base_url.or(g.base_url),
            model: p.model.or(g.model),
        }),
        (p, g) => p.or(g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_toml_parses() {
        let config = Config::parse(&Config::default_toml(), &PathBuf::from("config.toml")).unwrap();
        assert_eq!(config.model, crate::constants::DEFAULT_MODEL);
        assert_eq!(config.default_provider.as_deref(), Some("gemini"));
        assert_eq!(config.max_iterations, Some(crate::constants::MAX_AGENT_ITERATIONS));
        assert_eq!(
            config.provider.gemini.unwrap().api_key.as_deref(),
            Some("{env:GEMINI_API_KEY}")
        );
    }

    #[test]
    fn test_merge_project_wins() {
        let global: Config = toml::from_str(
            r#"
max_iterations = 10
[provider.anthropic]
api_key = "global-key"
base_url = "https://global"
[tools]
wiki_top_k = 1
"#,
        )
        .unwrap();
        let project: Config = toml::from_str(
            r#"
model = "claude-sonnet-4-5"
max_iterations = 3
[provider.anthropic]
api_key = "project-key"
[tools]
output_dir = "notes"
"#,
        )
        .unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.model, "claude-sonnet-4-5");
        assert_eq!(merged.max_iterations, Some(3));
        let anthropic = merged.provider.anthropic.unwrap();
        assert_eq!(anthropic.api_key.as_deref(), Some("project-key"));
        assert_eq!(anthropic.base_url.as_deref(), Some("https://global"));
        assert_eq!(merged.tools.wiki_top_k, Some(1));
        assert_eq!(merged.tools.output_dir.as_deref(), Some("notes"));
    }
}
