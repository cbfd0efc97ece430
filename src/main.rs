//! Entry point for sleuth, a terminal research assistant.
//!
//! This binary loads environment variables, sets up logging, parses CLI
//! arguments via [`cli`], and runs one research session.

mod agent;
mod answer;
mod cli;
mod config;
mod constants;
mod format;
mod message;
mod output;
mod provider;
mod tools;

use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs the sleuth CLI.
///
/// Loads `.env` files (silently ignored if absent) before anything reads
/// credentials. Exits non-zero on an empty query or a failed run.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    init_logging(cli.verbose);

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so they never mix with the report on stdout.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sleuth=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "sleuth=warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
