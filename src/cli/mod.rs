pub mod prompt;
pub mod run;
pub mod schema;

use crate::config::{Config, Provider};
use crate::error::ConfigError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatgrade")]
#[command(
    author,
    version,
    about = "Grade support dialogues against a fixed rubric, in batches, through a text-completion service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grade every record of a CSV file and write the results table
    Run(RunArgs),

    /// Print the exact request payload for one batch (for replaying a logged batch)
    Prompt(PromptArgs),

    /// Print JSON Schema for config validation
    Schema,
}

/// Settings shared by every command that reads an input table
#[derive(Args, Clone, Debug)]
pub struct TableArgs {
    /// Input CSV with a header row
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to config file (default: chatgrade.yaml when present)
    #[arg(short, long, env = "CHATGRADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Column holding the dialogue text (default: message/conversation/chat/text, else the first)
    #[arg(long)]
    pub text_column: Option<String>,

    /// Records per request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Token separating records in the request and answers in the reply
    #[arg(long)]
    pub delimiter: Option<String>,
}

impl TableArgs {
    /// Config file values with command-line overrides applied
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::resolve(self.config.as_deref())?;

        if let Some(column) = &self.text_column {
            config.text_column = Some(column.clone());
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Output CSV (truncated unless --resume)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pause between batches in milliseconds
    #[arg(long)]
    pub batch_delay_ms: Option<u64>,

    /// Completion backend: gemini, claude_cli or command
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Override the backend's model
    #[arg(long)]
    pub model: Option<String>,

    /// Continue after the rows an earlier run already wrote
    #[arg(long)]
    pub resume: bool,

    /// Skip writing <output>.summary.json
    #[arg(long)]
    pub no_summary: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Zero-based batch index
    #[arg(long, default_value_t = 0)]
    pub batch: usize,
}
