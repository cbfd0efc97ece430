//! Adapter bridging sleuth's [`Tool`] trait to rig-core's [`ToolDyn`] trait.
//!
//! [`RigToolAdapter`] wraps a research tool so its definition is included in
//! LLM API requests. The dispatch loop in [`crate::agent`] runs tools itself;
//! `call()` is only reached if rig-core is ever asked to execute one.

use std::pin::Pin;
use std::sync::Arc;

use rig::completion::ToolDefinition as RigToolDefinition;
use rig::tool::{ToolDyn, ToolError};

use super::Tool;

/// Bridges a sleuth [`Tool`] to rig-core's [`ToolDyn`] trait.
pub struct RigToolAdapter {
    tool: Arc<dyn Tool>,
}

impl RigToolAdapter {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

impl ToolDyn for RigToolAdapter {
    fn name(&self) -> String {
        self.tool.name().to_string()
    }

    fn definition<'a>(
        &'a self,
        _prompt: String,
    ) -> Pin<Box<dyn std::future::Future<Output = RigToolDefinition> + Send + 'a>> {
        let name = self.tool.name().to_string();
        let description = self.tool.description().to_string();
        let parameters = self.tool.schema();
        Box::pin(async move {
            RigToolDefinition {
                name,
                description,
                parameters,
            }
        })
    }

    fn call<'a>(
        &'a self,
        args: String,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let input: serde_json::Value =
                serde_json::from_str(&args).map_err(ToolError::JsonError)?;
            // Failures go back as text so the model can react to them.
            match self.tool.execute(input).await {
                Ok(output) if output.is_error => Ok(format!("Error: {}", output.content)),
                Ok(output) => Ok(output.content),
                Err(e) => Ok(format!("Error: {}", e)),
            }
        })
    }
}
