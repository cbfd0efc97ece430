//! LLM provider abstraction for sleuth.
//!
//! Wraps rig-core's provider clients behind a [`Provider`] struct with enum
//! dispatch. [`Provider`] is the production [`crate::agent::ModelClient`].
//! Supports Gemini, Anthropic, OpenAI, OpenRouter, and Ollama via `ProviderKind`.

mod client;
mod kind;
mod resolve;

pub use client::Provider;
pub use resolve::resolve_model;
