//! Terminal formatting for the final research report.

use colored::Colorize;
use std::collections::BTreeSet;

use crate::answer::ResearchResponse;

/// Format a parsed research response for terminal display.
///
/// `observed_tools` is what the dispatch loop actually ran; it is shown
/// next to the model's own claim when the two differ.
pub fn format_report(response: &ResearchResponse, observed_tools: &BTreeSet<String>) -> String {
    let mut out = String::new();
    out.push_str(&rule());
    out.push('\n');
    out.push_str(&format!("{} {}\n\n", "Topic:".cyan().bold(), response.topic.bold()));
    out.push_str(&format!("{}\n", "Summary:".cyan().bold()));
    out.push_str(&render_markdown_lite(&response.summary));
    out.push_str("\n\n");

    out.push_str(&format!("{}\n", "Sources:".cyan().bold()));
    if response.sources.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for source in &response.sources {
        out.push_str(&format!("  - {}\n", source));
    }
    out.push('\n');

    out.push_str(&format!(
        "{} {}\n",
        "Tools used:".cyan().bold(),
        list_or_none(response.tools_used.iter())
    ));
    let claimed: BTreeSet<&String> = response.tools_used.iter().collect();
    let observed: BTreeSet<&String> = observed_tools.iter().collect();
    if claimed != observed {
        out.push_str(&format!(
            "{}\n",
            format!("(tools actually run: {})", list_or_none(observed_tools.iter())).dimmed()
        ));
    }
    out.push_str(&rule());
    out
}

fn list_or_none<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let joined = items.map(String::as_str).collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

/// A dimmed horizontal rule sized to the terminal (capped at 80 columns).
fn rule() -> String {
    let width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
        .clamp(1, 80);
    "─".repeat(width).dimmed().to_string()
}

/// Minimal markdown renderer for terminal output.
/// Not a full parser. Handles the three most common patterns
/// in LLM output: bold, inline code, and fenced code blocks.
pub fn render_markdown_lite(text: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if line.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            output.push_str(&format!("  {}\n", line.dimmed()));
            continue;
        }

        output.push_str(&render_inline(line));
        output.push('\n');
    }

    if output.ends_with('\n') {
        output.pop();
    }
    output
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        if i + 1 < len && chars[i] == '*' && chars[i + 1] == '*' {
            if let Some(end) = find_closing(&chars, i + 2, &['*', '*']) {
                let bold_text: String = chars[i + 2..end].iter().collect();
                result.push_str(&bold_text.bold().to_string());
                i = end + 2;
                continue;
            }
        }

        if chars[i] == '`' {
            if let Some(end) = find_closing(&chars, i + 1, &['`']) {
                let code_text: String = chars[i + 1..end].iter().collect();
                result.push_str(&code_text.dimmed().to_string());
                i = end + 1;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

fn find_closing(chars: &[char], start: usize, pat: &[char]) -> Option<usize> {
    chars
        .get(start..)?
        .windows(pat.len())
        .position(|w| w == pat)
        .map(|offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_markdown_lite_strips_markers() {
        plain();
        assert_eq!(
            render_markdown_lite("Mount **Fuji** is `3776 m`"),
            "Mount Fuji is 3776 m"
        );
        assert_eq!(render_markdown_lite("```\ncode\n```\nafter"), "  code\nafter");
        assert_eq!(render_markdown_lite("unclosed **bold"), "unclosed **bold");
    }

    #[test]
    fn test_report_lists_fields() {
        plain();
        let response = ResearchResponse {
            topic: "Mount Fuji".into(),
            summary: "Tallest mountain in Japan.".into(),
            sources: vec!["https://en.wikipedia.org/wiki/Mount_Fuji".into()],
            tools_used: vec!["search".into()],
        };
        let observed: BTreeSet<String> = ["search".to_string()].into();
        let report = format_report(&response, &observed);
        assert!(report.contains("Topic: Mount Fuji"));
        assert!(report.contains("  - https://en.wikipedia.org/wiki/Mount_Fuji"));
        assert!(report.contains("Tools used: search"));
        assert!(!report.contains("actually run"));

        let report = format_report(&response, &BTreeSet::new());
        assert!(report.contains("(tools actually run: none)"));
    }
}
