//! Progress rendering abstraction for sleuth.
//!
//! Defines the [`Renderer`] trait that decouples the dispatch loop from the
//! display layer. [`StdoutRenderer`] prints each decision point to the
//! terminal; tests plug in a recorder instead.

use colored::Colorize;
use serde_json::Value;

use crate::constants::TOOL_PREVIEW_CHARS;

/// Receives the loop's decision points as they happen.
pub trait Renderer {
    /// A round of tool execution is starting.
    fn iteration_start(&mut self, iteration: usize, max: usize);

    /// Free text the model sent alongside (or instead of) tool requests.
    fn model_text(&mut self, text: &str);

    /// A tool is about to run.
    fn tool_start(&mut self, name: &str, arguments: &Value);

    /// A tool finished (or failed, or was unknown).
    fn tool_result(&mut self, name: &str, content: &str, is_error: bool);

    /// The iteration cap stopped tool dispatch.
    fn cap_reached(&mut self, max: usize);

    /// The closing structured-answer request is being sent.
    fn finalizing(&mut self);
}

/// Renders progress to stdout with colors.
pub struct StdoutRenderer;

impl StdoutRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for StdoutRenderer {
    fn iteration_start(&mut self, iteration: usize, max: usize) {
        println!("{}", format!("[iteration {}/{}]", iteration, max).dimmed());
    }

    fn model_text(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            println!("{}", text.dimmed());
        }
    }

    fn tool_start(&mut self, name: &str, arguments: &Value) {
        println!("{} {} {}", "→".yellow(), name.yellow().bold(), arguments);
    }

    fn tool_result(&mut self, name: &str, content: &str, is_error: bool) {
        let preview = preview(content, TOOL_PREVIEW_CHARS);
        if is_error {
            println!("  {} {}: {}", "✗".red(), name, preview.red());
        } else {
            println!("  {} {}", "✓".green(), preview.dimmed());
        }
    }

    fn cap_reached(&mut self, max: usize) {
        println!(
            "{}",
            format!("Reached {} iterations, asking for the final answer.", max).yellow()
        );
    }

    fn finalizing(&mut self) {
        println!("{}", "Writing final answer...".dimmed());
        println!();
    }
}

/// First `max` characters of `text` on a single line.
fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_flattens_and_truncates() {
        assert_eq!(preview("a\n  b\tc", 10), "a b c");
        assert_eq!(preview("abcdef", 3), "abc…");
    }
}
