//! The bounded tool-dispatch loop.
//!
//! [`ResearchAgent::run`] seeds a conversation with the research task, asks
//! the [`ModelClient`] for the next step, executes any requested tools in
//! order, feeds the results back, and repeats until the model stops asking
//! for tools or the iteration cap is hit. A closing turn then asks for the
//! answer in the structured format.
//!
//! Tool failures and unknown tool names become error results the model can
//! see; only model failures end a run early.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::answer::format_instructions;
use crate::constants::{
    FINAL_ANSWER_PROMPT, MAX_AGENT_ITERATIONS, MODEL_TIMEOUT_SECS, TOOL_TIMEOUT_SECS,
};
use crate::message::{Conversation, Message, ModelStep, ToolCall};
use crate::output::Renderer;
use crate::tools::ToolRegistry;

/// The hosted model the loop talks to.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, for display.
    fn model_name(&self) -> &str;

    /// Tool-calling turn: the model may answer with text, tool requests, or both.
    async fn step(&self, history: &[Message], tools: &ToolRegistry) -> Result<ModelStep>;

    /// Closing turn: the tools stay defined but the model may not call them.
    async fn answer(&self, history: &[Message], tools: &ToolRegistry) -> Result<String>;
}

/// Why a run ended without an answer.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Query cannot be empty")]
    EmptyQuery,
    #[error("model call failed during {stage}")]
    Model {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("model call timed out after {after:?} during {stage}")]
    ModelTimeout {
        stage: &'static str,
        after: Duration,
    },
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// The closing turn's raw text.
    pub answer: String,
    /// Every tool name the model requested and the loop dispatched.
    pub tools_used: BTreeSet<String>,
    /// Rounds of tool execution performed.
    pub iterations: usize,
    /// True when the cap stopped a model that still wanted tools.
    pub cap_reached: bool,
}

/// Mutable state of one run. Created by `run`, dropped when it returns.
struct RunState {
    history: Conversation,
    iteration: usize,
    tools_used: BTreeSet<String>,
}

impl RunState {
    fn new(task: String) -> Self {
        let mut history = Conversation::new();
        history.push(Message::task(task));
        Self {
            history,
            iteration: 0,
            tools_used: BTreeSet::new(),
        }
    }

    /// Appends a model step. Calls the provider left without an id get a
    /// fresh one; provider ids are kept verbatim so results echo them unchanged.
    fn record_step(&mut self, mut step: ModelStep) -> ModelStep {
        for call in step.tool_calls.iter_mut().filter(|c| c.id.is_empty()) {
            call.id = Uuid::new_v4().to_string();
        }
        self.history.push(Message::ModelStep(step.clone()));
        step
    }
}

/// Drives one research conversation against a [`ModelClient`] and a [`ToolRegistry`].
pub struct ResearchAgent<'a> {
    model: &'a dyn ModelClient,
    tools: &'a ToolRegistry,
    max_iterations: usize,
    model_timeout: Duration,
    tool_timeout: Duration,
}

impl<'a> ResearchAgent<'a> {
    pub fn new(model: &'a dyn ModelClient, tools: &'a ToolRegistry) -> Self {
        Self {
            model,
            tools,
            max_iterations: MAX_AGENT_ITERATIONS,
            model_timeout: Duration::from_secs(MODEL_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(TOOL_TIMEOUT_SECS),
        }
    }

    /// Sets the iteration cap. Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_timeouts(mut self, model_timeout: Duration, tool_timeout: Duration) -> Self {
        self.model_timeout = model_timeout;
        self.tool_timeout = tool_timeout;
        self
    }

    /// Runs the dispatch loop for `query` and returns the final answer text
    /// plus the set of tools used.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyQuery`] before any model call if `query` is
    /// blank, and [`AgentError::Model`] / [`AgentError::ModelTimeout`] if any
    /// model call fails. The partial history is discarded in both cases.
    pub async fn run(
        &self,
        query: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<RunOutcome, AgentError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::EmptyQuery);
        }

        let mut state = RunState::new(self.task_prompt(query));
        info!(
            model = self.model.model_name(),
            max_iterations = self.max_iterations,
            "starting research run"
        );

        let first = self.request_step(&state.history, "initial step").await?;
        let mut step = state.record_step(first);

        while step.requests_tools() && state.iteration < self.max_iterations {
            state.iteration += 1;
            debug!(iteration = state.iteration, calls = step.tool_calls.len(), "tool round");
            renderer.iteration_start(state.iteration, self.max_iterations);
            if let Some(text) = &step.text {
                renderer.model_text(text);
            }

            for call in &step.tool_calls {
                state.tools_used.insert(call.name.clone());
                let result = self.dispatch(call, renderer).await;
                state.history.push(result);
            }

            let next = self.request_step(&state.history, "tool round").await?;
            step = state.record_step(next);
        }

        let cap_reached = step.requests_tools();
        if cap_reached {
            warn!(max_iterations = self.max_iterations, "iteration cap reached");
            renderer.cap_reached(self.max_iterations);
            // Providers reject tool requests left without results.
            for call in &step.tool_calls {
                state.history.push(Message::tool_error(
                    call,
                    "Not executed: the tool-call limit for this run was reached.",
                ));
            }
        }

        state.history.push(Message::task(closing_prompt()));
        renderer.finalizing();
        debug!(messages = state.history.len(), "requesting final answer");
        let closing = self.model.answer(state.history.messages(), self.tools);
        let answer = match timeout(self.model_timeout, closing).await {
            Ok(Ok(text)) => text,
            Ok(Err(source)) => {
                return Err(AgentError::Model {
                    stage: "final answer",
                    source,
                })
            }
            Err(_) => {
                return Err(AgentError::ModelTimeout {
                    stage: "final answer",
                    after: self.model_timeout,
                })
            }
        };

        Ok(RunOutcome {
            answer,
            tools_used: state.tools_used,
            iterations: state.iteration,
            cap_reached,
        })
    }

    async fn request_step(
        &self,
        history: &Conversation,
        stage: &'static str,
    ) -> Result<ModelStep, AgentError> {
        match timeout(self.model_timeout, self.model.step(history.messages(), self.tools)).await {
            Ok(Ok(step)) => Ok(step),
            Ok(Err(source)) => Err(AgentError::Model { stage, source }),
            Err(_) => Err(AgentError::ModelTimeout {
                stage,
                after: self.model_timeout,
            }),
        }
    }

    /// Executes one tool call and turns every outcome into a result message.
    async fn dispatch(&self, call: &ToolCall, renderer: &mut dyn Renderer) -> Message {
        renderer.tool_start(&call.name, &call.arguments);

        let message = match self.tools.get(&call.name) {
            None => {
                warn!(tool = %call.name, "model requested unknown tool");
                Message::tool_error(
                    call,
                    format!(
                        "Tool '{}' not found. Available tools: {}",
                        call.name,
                        self.tool_names().join(", ")
                    ),
                )
            }
            Some(tool) => {
                match timeout(self.tool_timeout, tool.execute(call.arguments.clone())).await {
                    Ok(Ok(output)) if output.is_error => Message::tool_error(call, output.content),
                    Ok(Ok(output)) => Message::tool_success(call, output.content),
                    Ok(Err(e)) => {
                        warn!(tool = %call.name, error = %e, "tool failed");
                        Message::tool_error(call, format!("Error: {:#}", e))
                    }
                    Err(_) => {
                        warn!(tool = %call.name, "tool timed out");
                        Message::tool_error(
                            call,
                            format!(
                                "Error: tool '{}' timed out after {}s",
                                call.name,
                                self.tool_timeout.as_secs()
                            ),
                        )
                    }
                }
            }
        };

        if let Message::ToolResult {
            content, is_error, ..
        } = &message
        {
            renderer.tool_result(&call.name, content, *is_error);
        }
        message
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.definitions().into_iter().map(|d| d.name).collect()
    }

    /// The seeded task: the query plus a description of each available tool.
    fn task_prompt(&self, query: &str) -> String {
        let tool_list = self
            .tools
            .definitions()
            .iter()
            .map(|d| format!("- {}: {}", d.name, d.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Research the following query, using the available tools when they help.\n\n\
Query: {}\n\nAvailable tools:\n{}",
            query, tool_list
        )
    }
}

fn closing_prompt() -> String {
    format!("{}\n\n{}", FINAL_ANSWER_PROMPT, format_instructions())
}
