//! Structured research answers.
//!
//! The closing model turn is asked to reply with a JSON object matching
//! [`ResearchResponse`]. Parsing is best-effort: code fences are stripped,
//! and a failure keeps the raw text so the caller can still show it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed schema a research run is summarised into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub topic: String,
    pub summary: String,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
}

/// The final answer did not match [`ResearchResponse`].
#[derive(Debug, Error)]
#[error("final answer is not a valid research response: {source}")]
pub struct AnswerParseError {
    /// The model's text, unmodified.
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Describes the expected JSON shape to the model.
pub fn format_instructions() -> &'static str {
    r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

{"type": "object", "properties": {"topic": {"type": "string"}, "summary": {"type": "string"}, "sources": {"type": "array", "items": {"type": "string"}}, "tools_used": {"type": "array", "items": {"type": "string"}}}, "required": ["topic", "summary", "sources", "tools_used"]}

Return only the JSON object."#
}

/// Removes a surrounding markdown code fence (```` ``` ```` or ```` ```json ````), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse the model's final text into a [`ResearchResponse`].
///
/// Tries the fence-stripped text first, then the outermost `{...}` span so
/// stray prose around the object does not fail the parse.
pub fn parse_research_response(raw: &str) -> Result<ResearchResponse, AnswerParseError> {
    let body = strip_code_fences(raw);
    match serde_json::from_str(body) {
        Ok(response) => Ok(response),
        Err(first_err) => {
            let span = match (body.find('{'), body.rfind('}')) {
                (Some(start), Some(end)) if start < end => &body[start..=end],
                _ => {
                    return Err(AnswerParseError {
                        raw: raw.to_string(),
                        source: first_err,
                    })
                }
            };
            serde_json::from_str(span).map_err(|_| AnswerParseError {
                raw: raw.to_string(),
                source: first_err,
            })
        }
    }
}
