mod claude;
mod command;
mod gemini;
mod retry;

pub use claude::ClaudeClient;
pub use command::CommandClient;
pub use gemini::GeminiClient;
pub use retry::RetryingClient;

use crate::config::{Config, Provider};
use crate::error::{ConfigError, ProviderError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
pub struct Completion {
    pub text: String,
    pub duration: Duration,
}

/// The one capability the pipeline needs from a text-generation backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, payload: &str) -> Result<Completion, ProviderError>;
}

/// Build the configured backend, wrapped in retries.
/// Fails when the backend cannot possibly work (missing credential or program).
pub fn create_client(config: &Config) -> Result<Arc<dyn CompletionClient>, ConfigError> {
    let inner: Arc<dyn CompletionClient> = match config.provider {
        Provider::Gemini => {
            let settings = &config.providers.gemini;
            let api_key = std::env::var(&settings.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    ConfigError::MissingCredential(settings.api_key_env.clone(), "gemini")
                })?;
            Arc::new(
                GeminiClient::new(
                    api_key,
                    settings.model.clone(),
                    settings.endpoint.clone(),
                    Duration::from_secs(settings.timeout_sec),
                )
                .map_err(|e| ConfigError::Provider(Provider::Gemini.to_string(), e.to_string()))?,
            )
        }
        Provider::ClaudeCli => Arc::new(ClaudeClient {
            binary: config.providers.claude_cli.binary.clone(),
            model: config.providers.claude_cli.model.clone(),
            timeout: Duration::from_secs(config.providers.claude_cli.timeout_sec),
        }),
        Provider::Command => {
            let settings = &config.providers.command;
            let program = settings.program.clone().ok_or_else(|| {
                ConfigError::Provider(
                    Provider::Command.to_string(),
                    "providers.command.program is not set".to_string(),
                )
            })?;
            Arc::new(CommandClient {
                program,
                args: settings.args.clone(),
                timeout: Duration::from_secs(settings.timeout_sec),
            })
        }
    };

    Ok(Arc::new(RetryingClient::new(inner, config.retry.clone())))
}
