//! Provider kind enumeration and default model mapping.
//!
//! Defines [`ProviderKind`] which identifies which LLM backend to use,
//! and [`default_model_for`] which returns the default model for each provider.

use anyhow::{anyhow, Result};

/// Identifies which LLM provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Gemini.
    Gemini,
    /// Anthropic (Claude models).
    Anthropic,
    /// OpenAI (GPT models).
    OpenAI,
    /// OpenRouter (multi-provider gateway).
    OpenRouter,
    /// Ollama (local models via OpenAI-compatible API).
    Ollama,
}

impl ProviderKind {
    /// Parses a provider name string into a [`ProviderKind`].
    ///
    /// Matching is case-insensitive. Returns an error for unknown providers.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!(
                "Unknown provider: {other}. Supported: gemini, anthropic, openai, openrouter, ollama"
            )),
        }
    }

    /// Config and environment key for this provider (e.g. `GEMINI_API_KEY`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }
}

/// Returns the default model identifier for a given provider.
pub fn default_model_for(provider: &ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Gemini => crate::constants::DEFAULT_MODEL,
        ProviderKind::Anthropic => crate::constants::DEFAULT_ANTHROPIC_MODEL,
        ProviderKind::OpenAI => crate::constants::DEFAULT_OPENAI_MODEL,
        ProviderKind::OpenRouter => crate::constants::DEFAULT_OPENROUTER_MODEL,
        ProviderKind::Ollama => crate::constants::OLLAMA_DEFAULT_MODEL,
    }
}
