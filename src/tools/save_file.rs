//! Save tool: appends research text to a file in the output directory.

use anyhow::Result;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use super::{Tool, ToolOutput};
use crate::constants::DEFAULT_OUTPUT_FILENAME;

/// Tool that appends timestamped research output to a text file.
///
/// Each call appends one block, so repeated saves to the same file build up
/// a log. Filenames are resolved relative to the output directory; paths that
/// would escape it are rejected.
pub struct SaveTextTool {
    /// Directory saved files land in.
    output_dir: PathBuf,
}

impl SaveTextTool {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Resolve `filename` under the output directory.
    ///
    /// Absolute paths and `..` components are rejected before touching the
    /// filesystem; parent directories inside the output directory are created.
    fn resolve_path(&self, filename: &str) -> Result<PathBuf> {
        let relative = Path::new(filename);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            anyhow::bail!("Path escapes output directory: {}", filename);
        }
        if relative.file_name().is_none() {
            anyhow::bail!("Path has no filename: {}", filename);
        }

        let resolved = self.output_dir.join(relative);
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(resolved)
    }
}

#[derive(Deserialize)]
struct SaveInput {
    text: String,
    #[serde(default)]
    filename: Option<String>,
}

/// The block appended for one save.
fn format_entry(text: &str, timestamp: &str) -> String {
    format!(
        "--- Research Output ---\nTimestamp: {}\n\n{}\n\n",
        timestamp, text
    )
}

#[async_trait::async_trait]
impl Tool for SaveTextTool {
    fn name(&self) -> &str {
        "save_text_to_file"
    }

    fn description(&self) -> &str {
        "Save structured research data to a text file. Appends to the file if it already exists."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text to save"
                },
                "filename": {
                    "type": "string",
                    "description": format!("Target filename (default: {})", DEFAULT_OUTPUT_FILENAME)
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput> {
        let input: SaveInput = serde_json::from_value(input)?;
        let filename = input
            .filename
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_OUTPUT_FILENAME);
        let path = self.resolve_path(filename)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(format_entry(&input.text, &timestamp).as_bytes())?;

        Ok(ToolOutput::success(format!(
            "Data successfully saved to {}",
            filename
        )))
    }
}
