use super::command::{command_for, run_with_stdin};
use super::{Completion, CompletionClient};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Claude Code CLI in print mode; the payload goes in on stdin
pub struct ClaudeClient {
    pub binary: PathBuf,
    pub model: String,
    pub timeout: Duration,
}

#[async_trait]
impl CompletionClient for ClaudeClient {
    fn name(&self) -> &'static str {
        "claude_cli"
    }

    async fn complete(&self, payload: &str) -> Result<Completion, ProviderError> {
        let mut cmd = command_for(&self.binary);

        // Ensure subscription auth is used (not API key)
        cmd.env_remove("ANTHROPIC_API_KEY");

        cmd.arg("-p")
            .arg("--model")
            .arg(&self.model)
            .arg("--output-format")
            .arg("json");

        let mut completion = run_with_stdin(cmd, payload, self.timeout).await?;
        completion.text = unwrap_result(&completion.text)?;
        Ok(completion)
    }
}

/// The CLI wraps the model text in {"result": "...", "is_error": ..., ...}
fn unwrap_result(stdout: &str) -> Result<String, ProviderError> {
    #[derive(Deserialize)]
    struct ClaudeOutput {
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        is_error: bool,
    }

    match serde_json::from_str::<ClaudeOutput>(stdout.trim()) {
        Ok(out) if out.is_error => Err(ProviderError::Response(
            out.result.unwrap_or_else(|| "claude reported an error".to_string()),
        )),
        Ok(ClaudeOutput {
            result: Some(result),
            ..
        }) => Ok(result),
        // Plain text, or JSON that is not the envelope
        _ => Ok(stdout.to_string()),
    }
}
