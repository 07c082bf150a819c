use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod error;
mod output;
mod parser;
mod prompt;
mod provider;
mod rubric;
mod runner;
mod table;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Progress is reported at info; --verbose adds raw replies and fingerprints
    let filter = if cli.verbose {
        EnvFilter::new("chatgrade=debug")
    } else {
        EnvFilter::new("chatgrade=info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Prompt(args) => cli::prompt::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
