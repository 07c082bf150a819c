use super::{Completion, CompletionClient};
use crate::config::RetryConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Execute an async operation with jittered exponential backoff.
/// Errors rejected by `should_retry` are returned immediately.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempts = 0;
    let mut backoff_ms = config.backoff_base_ms;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => {
                warn!("Attempt {} failed, not retrying: {}", attempts, e);
                return Err(e);
            }
            Err(e) if attempts >= config.max_attempts => {
                if attempts > 1 {
                    warn!("All {} attempts failed: {}", attempts, e);
                }
                return Err(e);
            }
            Err(e) => {
                // Jittered backoff: base * 2^attempt + random(0..base)
                let jitter = if config.backoff_base_ms > 0 {
                    rand::random::<u64>() % config.backoff_base_ms
                } else {
                    0
                };
                let delay = Duration::from_millis(backoff_ms + jitter);

                warn!(
                    "Attempt {} failed: {}. Retrying in {:?}...",
                    attempts, e, delay
                );

                sleep(delay).await;
                backoff_ms = backoff_ms.saturating_mul(2);
            }
        }
    }
}

/// Decorates a backend with [`retry_with_backoff`]
pub struct RetryingClient {
    inner: Arc<dyn CompletionClient>,
    config: RetryConfig,
}

impl RetryingClient {
    pub fn new(inner: Arc<dyn CompletionClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl CompletionClient for RetryingClient {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn complete(&self, payload: &str) -> Result<Completion, ProviderError> {
        retry_with_backoff(
            &self.config,
            || self.inner.complete(payload),
            ProviderError::is_retryable,
        )
        .await
    }
}
