//! Command-line interface definition and dispatch for sleuth.
//!
//! Uses [`clap`] for argument parsing with derive macros. With no arguments
//! sleuth prompts for a query, runs the research loop, and prints the
//! structured report.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::agent::{AgentError, ResearchAgent};
use crate::answer::parse_research_response;
use crate::config::Config;
use crate::constants::{APP_NAME, HISTORY_FILENAME, QUERY_PROMPT};
use crate::format::format_report;
use crate::output::StdoutRenderer;
use crate::provider::{self, Provider};
use crate::tools::ToolRegistry;

/// Top-level CLI structure for sleuth.
///
/// Every flag is optional; `sleuth` alone prompts for a query and uses the
/// configured (or default) model.
#[derive(Parser)]
#[command(name = "sleuth", version, about = "A terminal research assistant")]
pub struct Cli {
    /// What to research. Prompted for when omitted.
    pub query: Vec<String>,
    /// Provider to use (gemini, anthropic, openai, openrouter, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,
    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,
    /// Maximum rounds of tool calls before the final answer
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Log loop decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Runs one research session.
///
/// An empty query fails before config is loaded or any model is contacted.
pub async fn run(cli: Cli) -> Result<()> {
    let query = if cli.query.is_empty() {
        read_query()?
    } else {
        cli.query.join(" ")
    };
    let query = query.trim();
    if query.is_empty() {
        return Err(AgentError::EmptyQuery.into());
    }

    let config = Config::load()?;
    let selection =
        provider::resolve_model(cli.provider.as_deref(), cli.model.as_deref(), &config)?;
    let provider = Provider::from_config(&config, &selection)?;
    let tools = ToolRegistry::with_builtins(&config.tools)?;
    let max_iterations = cli.max_iterations.unwrap_or_else(|| config.max_iterations());

    println!(
        "{} [model: {}]",
        APP_NAME.bold().cyan(),
        selection.model.yellow(),
    );
    println!();
    println!("{} {}", ">".green().bold(), query);
    println!();

    let agent = ResearchAgent::new(&provider, &tools)
        .with_max_iterations(max_iterations)
        .with_timeouts(config.model_timeout(), config.tool_timeout());
    let mut renderer = StdoutRenderer::new();
    let outcome = agent
        .run(query, &mut renderer)
        .await
        .context("Research run failed")?;
    tracing::info!(
        iterations = outcome.iterations,
        cap_reached = outcome.cap_reached,
        tools = ?outcome.tools_used,
        "research run finished"
    );

    match parse_research_response(&outcome.answer) {
        Ok(response) => {
            println!("{}", "--- Parsed Successfully ---".green().bold());
            println!("{}", format_report(&response, &outcome.tools_used));
        }
        Err(err) => {
            tracing::warn!(error = %err, "structured answer did not parse");
            println!("{} {}", "Parsing failed. Model sent:".yellow().bold(), err.raw);
            println!("{} {}", "Error:".yellow(), err);
        }
    }

    Ok(())
}

/// Prompts for a query with readline editing and persistent history.
///
/// Ctrl+C and Ctrl+D return an empty query.
fn read_query() -> Result<String> {
    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()
        .ok()
        .map(|dir| dir.join(HISTORY_FILENAME));
    if let Some(path) = history_path.as_ref().filter(|p| p.exists()) {
        let _ = rl.load_history(path);
    }

    match rl.readline(QUERY_PROMPT) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
                if let Some(path) = &history_path {
                    if let Some(parent) = path.parent() {
                        let _ = std::fs::create_dir_all(parent);
                    }
                    let _ = rl.save_history(path);
                }
            }
            Ok(line)
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
        Err(e) => Err(e).context("Failed to read query"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_flags() {
        let cli = Cli::parse_from(["sleuth"]);
        assert!(cli.query.is_empty());
        assert!(cli.provider.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_query_and_flags() {
        let cli = Cli::parse_from([
            "sleuth",
            "--max-iterations",
            "3",
            "-p",
            "anthropic",
            "Tell",
            "me",
            "about",
            "Mount",
            "Fuji",
        ]);
        assert_eq!(cli.query.join(" "), "Tell me about Mount Fuji");
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.provider.as_deref(), Some("anthropic"));
    }

    #[tokio::test]
    async fn test_blank_query_fails_before_loading_config() {
        let cli = Cli::parse_from(["sleuth", "   "]);
        let err = run(cli).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AgentError>(),
            Some(AgentError::EmptyQuery)
        ));
    }
}
