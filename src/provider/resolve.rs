//! Model resolution logic for sleuth.
//!
//! Resolves which provider and model to use based on CLI flags, config file,
//! and hardcoded defaults. Supports `provider/model` shorthand syntax.

use anyhow::Result;

use super::kind::{default_model_for, ProviderKind};
use crate::config::Config;

use crate::constants::DEFAULT_PROVIDER;

/// Resolved provider + model pair.
#[derive(Debug)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Resolve which provider and model to use.
/// Priority: CLI flags > config files > defaults.
///
/// Accepts these formats:
///   --model anthropic/claude-sonnet-4-5  (provider/model shorthand, only when --provider is omitted)
///   --provider openrouter --model "org/model-name"  (slash preserved as model name)
///   --provider anthropic  (uses the provider's configured or default model)
///   (nothing)  (uses config, then gemini-2.5-flash)
pub fn resolve_model(
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    config: &Config,
) -> Result<ModelSelection> {
    if cli_provider.is_none() {
        if let Some(model_str) = cli_model {
            if let Some((prov, model)) = model_str.split_once('/') {
                return Ok(ModelSelection {
                    provider: ProviderKind::from_str(prov)?,
                    model: model.to_string(),
                });
            }
        }
    }

    // A `provider/model` config value names the provider when nothing else does.
    let (config_hint, config_model) = match config.model_name() {
        Some(m) => split_config_model(m),
        None => (None, None),
    };

    let provider = match cli_provider.or(config.provider_name()) {
        Some(name) => ProviderKind::from_str(name)?,
        None => match config_hint {
            Some(kind) => kind,
            None => ProviderKind::from_str(DEFAULT_PROVIDER)?,
        },
    };

    // Per-provider model beats the global model; both beat the built-in default.
    let model = cli_model
        .map(String::from)
        .or_else(|| {
            config
                .provider_entry(provider.key())
                .and_then(|e| e.model.clone())
        })
        .or_else(|| {
            config_model.map(|m| match config_hint {
                Some(kind) if kind == provider => m.to_string(),
                // Another provider's prefix is part of the model id (e.g. OpenRouter).
                _ => config.model.clone(),
            })
        })
        .unwrap_or_else(|| default_model_for(&provider).to_string());

    Ok(ModelSelection { provider, model })
}

/// Splits a configured model into (provider, model) when its prefix names a
/// known provider. Otherwise the whole string is the model.
fn split_config_model(model: &str) -> (Option<ProviderKind>, Option<&str>) {
    match model.split_once('/') {
        Some((prov, rest)) => match ProviderKind::from_str(prov) {
            Ok(kind) => (Some(kind), Some(rest)),
            Err(_) => (None, Some(model)),
        },
        None => (None, Some(model)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ProviderEntry;

    #[test]
    fn test_defaults_to_gemini_flash() {
        let selection = resolve_model(None, None, &Config::default()).unwrap();
        assert_eq!(selection.provider, ProviderKind::Gemini);
        assert_eq!(selection.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_shorthand_only_without_provider_flag() {
        let config = Config::default();
        let s = resolve_model(None, Some("anthropic/claude-sonnet-4-5"), &config).unwrap();
        assert_eq!(s.provider, ProviderKind::Anthropic);
        assert_eq!(s.model, "claude-sonnet-4-5");

        let s = resolve_model(Some("openrouter"), Some("org/model"), &config).unwrap();
        assert_eq!(s.provider, ProviderKind::OpenRouter);
        assert_eq!(s.model, "org/model");
    }

    #[test]
    fn test_provider_flag_uses_provider_default() {
        let s = resolve_model(Some("OpenAI"), None, &Config::default()).unwrap();
        assert_eq!(s.provider, ProviderKind::OpenAI);
        assert_eq!(s.model, "gpt-4.1");
    }

    #[test]
    fn test_provider_entry_model_wins_over_default() {
        let mut config = Config::default();
        config.default_provider = Some("ollama".into());
        config.provider.ollama = Some(ProviderEntry {
            model: Some("mistral".into()),
            ..ProviderEntry::default()
        });
        let s = resolve_model(None, None, &config).unwrap();
        assert_eq!(s.provider, ProviderKind::Ollama);
        assert_eq!(s.model, "mistral");
    }

    #[test]
    fn test_config_shorthand_selects_provider() {
        let mut config = Config::default();
        config.model = "anthropic/claude-sonnet-4-5".into();
        let s = resolve_model(None, None, &config).unwrap();
        assert_eq!(s.provider, ProviderKind::Anthropic);
        assert_eq!(s.model, "claude-sonnet-4-5");

        // An explicit provider still wins, and keeps a foreign prefix in the id.
        let s = resolve_model(Some("openrouter"), None, &config).unwrap();
        assert_eq!(s.provider, ProviderKind::OpenRouter);
        assert_eq!(s.model, "anthropic/claude-sonnet-4-5");

        config.default_provider = Some("anthropic".into());
        let s = resolve_model(None, None, &config).unwrap();
        assert_eq!(s.provider, ProviderKind::Anthropic);
        assert_eq!(s.model, "claude-sonnet-4-5");
    }

    #[test]
    fn test_config_model_without_known_prefix_kept_whole() {
        let mut config = Config::default();
        config.default_provider = Some("openrouter".into());
        config.model = "meta-llama/llama-3.3-70b".into();
        let s = resolve_model(None, None, &config).unwrap();
        assert_eq!(s.provider, ProviderKind::OpenRouter);
        assert_eq!(s.model, "meta-llama/llama-3.3-70b");
    }

    #[test]
    fn test_unknown_provider_errors() {
        assert!(resolve_model(Some("bard"), None, &Config::default()).is_err());
    }
}
