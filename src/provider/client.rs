//! LLM provider client implementing [`ModelClient`].
//!
//! Contains the [`Provider`] struct which wraps rig-core provider clients
//! behind enum dispatch, keeping provider-specific details out of the dispatch
//! loop. Supports Gemini, Anthropic, OpenAI, OpenRouter, and Ollama.
//!
//! Each call is a single non-streaming completion: sleuth runs the tools
//! itself, so rig-core only ever sees tool definitions, never executes them.

use anyhow::{Context, Result};
use rig::client::CompletionClient;
use rig::completion::Completion;
use rig::message::{
    AssistantContent, Message as RigMessage, Text, ToolCall as RigToolCall, ToolChoice,
    ToolFunction,
};
use rig::providers::{anthropic, gemini, openai, openrouter};
use rig::OneOrMany;

use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::agent::ModelClient;
use crate::config::Config;
use crate::constants::{MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};
use crate::message::{Message, ModelStep, ToolCall};
use crate::tools::ToolRegistry;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Gemini(gemini::Client),
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to handle completion requests.
///
/// Agents are constructed on each call since they are cheap to create and
/// the tool-calling and closing turns need different tool choices.
pub struct Provider {
    client: ClientKind,
    model: String,
}

/// Builds a research agent (preamble, temperature, token limit) with tool
/// definitions registered via `.tools()`, and executes the block with the
/// agent bound to `$agent`.
macro_rules! with_agent_tools {
    ($client:expr, $model:expr, $rig_tools:expr, |$agent:ident| $body:expr) => {{
        let $agent = $client
            .agent($model)
            .preamble(SYSTEM_PROMPT)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .tools($rig_tools)
            .build();
        $body
    }};
}

/// Like [`with_agent_tools!`] but with `ToolChoice::None`, for the closing turn.
///
/// The definitions stay attached: Anthropic rejects a history holding
/// `tool_use` blocks when the request defines no tools.
macro_rules! with_closing_agent {
    ($client:expr, $model:expr, $rig_tools:expr, |$agent:ident| $body:expr) => {{
        let $agent = $client
            .agent($model)
            .preamble(SYSTEM_PROMPT)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .tool_choice(ToolChoice::None)
            .tools($rig_tools)
            .build();
        $body
    }};
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Gemini($client) => $body,
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

impl Provider {
    /// Creates a new [`Provider`] from the loaded application config.
    ///
    /// Resolves the API key through sleuth's config precedence chain
    /// (env var → config file → substitution) and builds the appropriate
    /// provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(config: &Config, selection: &ModelSelection) -> Result<Self> {
        let client = match selection.provider {
            ProviderKind::Gemini => {
                let api_key = config.resolve_api_key("gemini").context(
                    "No API key found for Gemini. Set GEMINI_API_KEY (or GOOGLE_API_KEY) or configure it in config.toml",
                )?;
                ClientKind::Gemini(
                    gemini::Client::new(&api_key).context("Failed to create Gemini client")?,
                )
            }
            ProviderKind::Anthropic => {
                let api_key = config
                    .resolve_api_key("anthropic")
                    .context("No API key found for Anthropic. Set ANTHROPIC_API_KEY or configure it in config.toml")?;
                ClientKind::Anthropic(
                    anthropic::Client::new(&api_key)
                        .context("Failed to create Anthropic client")?,
                )
            }
            ProviderKind::OpenAI => {
                let api_key = config
                    .resolve_api_key("openai")
                    .context("No API key found for OpenAI. Set OPENAI_API_KEY or configure it in config.toml")?;
                ClientKind::OpenAI(
                    openai::Client::new(&api_key).context("Failed to create OpenAI client")?,
                )
            }
            ProviderKind::OpenRouter => {
                let api_key = config
                    .resolve_api_key("openrouter")
                    .context("No API key found for OpenRouter. Set OPENROUTER_API_KEY or configure it in config.toml")?;
                ClientKind::OpenRouter(
                    openrouter::Client::new(&api_key)
                        .context("Failed to create OpenRouter client")?,
                )
            }
            ProviderKind::Ollama => {
                let base_url = config
                    .provider_entry("ollama")
                    .and_then(|o| o.base_url.as_deref())
                    .filter(|u| !u.is_empty())
                    .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                let client = openai::Client::builder()
                    .api_key("ollama")
                    .base_url(format!("{}/v1", base_url))
                    .build()
                    .context("Failed to create Ollama client")?;
                ClientKind::Ollama(client)
            }
        };
        tracing::debug!(provider = ?selection.provider, model = %selection.model, "provider ready");

        Ok(Self {
            client,
            model: selection.model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ModelClient for Provider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn step(&self, history: &[Message], tools: &ToolRegistry) -> Result<ModelStep> {
        let (prompt, chat_history) = split_history(history)?;

        let choice = dispatch!(self, |client| {
            // Build rig_tools inside dispatch! so each match arm gets a fresh Vec
            let rig_tools = tools.to_rig_tools();
            with_agent_tools!(client, &self.model, rig_tools, |agent| {
                agent
                    .completion(prompt.clone(), chat_history.clone())
                    .await
                    .context("Failed to build completion request")?
                    .send()
                    .await
                    .context("Completion request failed")?
                    .choice
            })
        });

        let step = step_from_choice(choice);
        tracing::debug!(
            tool_calls = step.tool_calls.len(),
            has_text = step.text.is_some(),
            "model step"
        );
        Ok(step)
    }

    async fn answer(&self, history: &[Message], tools: &ToolRegistry) -> Result<String> {
        let (prompt, chat_history) = split_history(history)?;

        let choice = dispatch!(self, |client| {
            let rig_tools = tools.to_rig_tools();
            with_closing_agent!(client, &self.model, rig_tools, |agent| {
                agent
                    .completion(prompt.clone(), chat_history.clone())
                    .await
                    .context("Failed to build completion request")?
                    .send()
                    .await
                    .context("Completion request failed")?
                    .choice
            })
        });

        let step = step_from_choice(choice);
        if step.requests_tools() {
            tracing::warn!("model requested tools during the closing turn; ignoring them");
        }
        Ok(step.text.unwrap_or_default())
    }
}

/// Splits history into rig's (prompt, chat history) pair: the last message
/// is the prompt, everything before it is history.
fn split_history(history: &[Message]) -> Result<(RigMessage, Vec<RigMessage>)> {
    let (last, rest) = history
        .split_last()
        .ok_or_else(|| anyhow::anyhow!("Cannot send an empty conversation"))?;
    Ok((
        convert_message_to_rig(last),
        rest.iter().map(convert_message_to_rig).collect(),
    ))
}

/// Collects a completion's content items into a [`ModelStep`].
fn step_from_choice(choice: OneOrMany<AssistantContent>) -> ModelStep {
    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for item in choice.into_iter() {
        match item {
            AssistantContent::Text(t) => text.push_str(&t.text),
            AssistantContent::ToolCall(tc) => {
                tool_calls.push(ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
            }
            _ => {
                // Reasoning and other content is not part of the conversation.
            }
        }
    }
    let text = (!text.trim().is_empty()).then_some(text);
    ModelStep { text, tool_calls }
}

/// Converts a sleuth [`Message`] to a rig-core [`RigMessage`].
///
/// - **UserTask** → `RigMessage::User` with text content
/// - **ModelStep** (text only) → `RigMessage::Assistant` with text content
/// - **ModelStep** (with tool calls) → `RigMessage::Assistant` with `ToolCall` content items
/// - **ToolResult** → `RigMessage::User` with `ToolResult` content, errors prefixed `Error:`
fn convert_message_to_rig(msg: &Message) -> RigMessage {
    match msg {
        Message::UserTask { text } => RigMessage::user(text.as_str()),
        Message::ModelStep(step) => {
            let text = step.text.as_deref().unwrap_or_default();
            if step.tool_calls.is_empty() {
                return RigMessage::assistant(text);
            }
            let mut items: Vec<AssistantContent> = Vec::new();
            if !text.is_empty() {
                items.push(AssistantContent::Text(Text {
                    text: text.to_string(),
                }));
            }
            for tc in &step.tool_calls {
                items.push(AssistantContent::ToolCall(RigToolCall::new(
                    tc.id.clone(),
                    ToolFunction::new(tc.name.clone(), tc.arguments.clone()),
                )));
            }
            RigMessage::Assistant {
                id: None,
                content: OneOrMany::many(items)
                    .unwrap_or_else(|_| OneOrMany::one(AssistantContent::text(""))),
            }
        }
        Message::ToolResult {
            call_id,
            content,
            is_error,
            ..
        } => {
            let body = if *is_error && !content.starts_with("Error:") {
                format!("Error: {}", content)
            } else {
                content.clone()
            };
            RigMessage::tool_result(call_id.clone(), body)
        }
    }
}
