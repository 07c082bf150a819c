use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Destination CSV, truncated at the start of every fresh run
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Records per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Token separating per-record texts in the request and answers in the reply
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Pause after each appended batch, to stay under rate limits
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Column holding the dialogue; picked automatically when unset
    #[serde(default)]
    pub text_column: Option<String>,

    /// Prefix the output with a UTF-8 byte order mark
    #[serde(default = "default_true")]
    pub write_bom: bool,

    /// Write `<output stem>.summary.json` after the run
    #[serde(default = "default_true")]
    pub summary: bool,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[default]
    Gemini,
    ClaudeCli,
    Command,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::ClaudeCli => write!(f, "claude_cli"),
            Provider::Command => write!(f, "command"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gemini" => Ok(Provider::Gemini),
            "claude_cli" | "claude" => Ok(Provider::ClaudeCli),
            "command" | "cmd" => Ok(Provider::Command),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub claude_cli: ClaudeCliConfig,

    #[serde(default)]
    pub command: CommandConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "default_gemini_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
            api_key_env: default_gemini_api_key_env(),
            timeout_sec: default_timeout_sec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClaudeCliConfig {
    #[serde(default = "default_claude_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_claude_model")]
    pub model: String,

    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: default_claude_binary(),
            model: default_claude_model(),
            timeout_sec: default_timeout_sec(),
        }
    }
}

/// Any program that reads the payload on stdin and prints the reply
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CommandConfig {
    #[serde(default)]
    pub program: Option<PathBuf>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: Vec::new(),
            timeout_sec: default_timeout_sec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}
