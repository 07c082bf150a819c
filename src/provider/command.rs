use super::{Completion, CompletionClient};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;

/// Runs a program with the payload on stdin; stdout is the reply
pub struct CommandClient {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

#[async_trait]
impl CompletionClient for CommandClient {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn complete(&self, payload: &str) -> Result<Completion, ProviderError> {
        let mut cmd = command_for(&self.program);
        cmd.args(&self.args);
        run_with_stdin(cmd, payload, self.timeout).await
    }
}

/// Use a string for PATH lookup if the binary is not an absolute/relative path
pub(super) fn command_for(binary: &Path) -> Command {
    let binary_str = binary.to_string_lossy();
    if binary_str.contains('/') || binary_str.contains('\\') {
        Command::new(binary)
    } else {
        Command::new(binary_str.as_ref())
    }
}

/// Spawn `cmd`, write `payload` to its stdin and collect stdout
pub(super) async fn run_with_stdin(
    mut cmd: Command,
    payload: &str,
    timeout: Duration,
) -> Result<Completion, ProviderError> {
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let start = std::time::Instant::now();

    let mut child = cmd.spawn()?;
    let stdin = child.stdin.take();

    // Feed stdin while draining stdout, both under the same deadline
    let write = async move {
        if let Some(mut stdin) = stdin {
            // A child that exits without reading its input is judged by its exit status
            match stdin.write_all(payload.as_bytes()).await {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }
        Ok::<(), std::io::Error>(())
    };
    let exchange = async {
        let (written, output) = tokio::join!(write, child.wait_with_output());
        written?;
        output
    };

    let output = tokio_timeout(timeout, exchange)
        .await
        .map_err(|_| ProviderError::Timeout(timeout))??;

    if !output.status.success() {
        return Err(ProviderError::NonZeroExit {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(Completion {
        text: String::from_utf8_lossy(&output.stdout).to_string(),
        duration: start.elapsed(),
    })
}
