//! Centralized constants for sleuth.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "sleuth";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "sleuth.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "query_history.txt";

/// Prompt shown when no query is given on the command line.
pub const QUERY_PROMPT: &str = "What can I help you research? ";

// --- Provider defaults ---

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Default LLM model identifier for Gemini.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default LLM model identifier for Anthropic.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "arcee-ai/trinity-large-preview:free";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

/// Sampling temperature. Research answers should be deterministic.
pub const TEMPERATURE: f64 = 0.0;

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 4096;

// --- Agent loop ---

/// Maximum rounds of tool execution before the final answer is forced.
pub const MAX_AGENT_ITERATIONS: usize = 10;

/// Seconds to wait for a single model call.
pub const MODEL_TIMEOUT_SECS: u64 = 120;

/// Seconds to wait for a single tool call.
pub const TOOL_TIMEOUT_SECS: u64 = 30;

/// Characters of a tool result echoed to the terminal.
pub const TOOL_PREVIEW_CHARS: usize = 200;

/// System prompt sent as the preamble of every model call.
pub const SYSTEM_PROMPT: &str = "You are a research assistant that will help generate a research paper. \
Answer the user query and use the necessary tools. \
Cite the sources you relied on.";

/// Instruction appended as the closing turn before the structured answer.
pub const FINAL_ANSWER_PROMPT: &str = "Now write the final answer. \
Wrap the output in this format and provide no other text.";

// --- Tool limits ---

/// Default file the save tool appends to.
pub const DEFAULT_OUTPUT_FILENAME: &str = "research_output.txt";

/// Maximum number of web search results returned.
pub const SEARCH_MAX_RESULTS: usize = 5;

/// DuckDuckGo HTML endpoint (no API key needed).
pub const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Number of Wikipedia pages summarised per lookup.
pub const WIKI_TOP_K: usize = 1;

/// Maximum characters kept from each Wikipedia summary.
pub const WIKI_MAX_CHARS: usize = 4000;

/// Wikipedia language edition.
pub const WIKI_LANGUAGE: &str = "en";

/// Timeout for outbound HTTP requests made by tools.
pub const HTTP_TIMEOUT_SECS: u64 = 20;

/// User agent sent by the network tools.
pub const USER_AGENT: &str = concat!("sleuth/", env!("CARGO_PKG_VERSION"));
