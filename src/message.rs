//! Message types for a research run's conversation history.
//!
//! A run's history is a [`Conversation`]: an append-only list of [`Message`]
//! variants. These are sleuth's internal types, converted to provider-specific
//! formats (e.g. rig-core's `Message`) only when sent to the LLM.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call (used to match results).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments to pass to the tool.
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One model turn: optional free text plus zero or more tool requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ModelStep {
    /// A step with text and no tool requests.
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A step that only requests tools.
    #[cfg(test)]
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }

    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A single entry in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Text sent on the user's behalf: the seeded task or the closing request.
    UserTask { text: String },
    /// A turn produced by the model.
    ModelStep(ModelStep),
    /// The outcome of one tool call, echoing the call's id.
    ToolResult {
        call_id: String,
        name: String,
        content: String,
        is_error: bool,
    },
}

impl Message {
    pub fn task(text: impl Into<String>) -> Self {
        Self::UserTask { text: text.into() }
    }

    /// Creates a successful tool result message to feed back to the LLM.
    pub fn tool_success(call: &ToolCall, content: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates a failed tool result message. The run continues; the model sees the error.
    pub fn tool_error(call: &ToolCall, content: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// Append-only conversation history owned by a single run.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_echoes_call_id() {
        let call = ToolCall::new("call_7", "search", json!({"query": "Mount Fuji"}));
        match Message::tool_error(&call, "boom") {
            Message::ToolResult {
                call_id,
                name,
                is_error,
                ..
            } => {
                assert_eq!(call_id, "call_7");
                assert_eq!(name, "search");
                assert!(is_error);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_conversation_keeps_append_order() {
        let call = ToolCall::new("1", "search", json!({}));
        let mut conv = Conversation::new();
        conv.push(Message::task("hi"));
        conv.push(Message::ModelStep(ModelStep::tools(vec![call.clone()])));
        conv.push(Message::tool_success(&call, "ok"));
        assert_eq!(conv.len(), 3);
        assert!(matches!(conv.messages()[0], Message::UserTask { .. }));
        assert!(matches!(&conv.messages()[1], Message::ModelStep(s) if s.requests_tools()));
        assert!(matches!(conv.messages()[2], Message::ToolResult { is_error: false, .. }));
    }

    #[test]
    fn test_message_serializes_with_kind_tag() {
        let value = serde_json::to_value(Message::task("hello")).unwrap();
        assert_eq!(value, json!({"kind": "user_task", "text": "hello"}));
    }
}
