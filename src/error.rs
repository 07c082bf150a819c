use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unsupported config version {0} (expected {1})")]
    UnsupportedVersion(u32, u32),

    #[error("Batch size must be at least 1")]
    ZeroBatchSize,

    #[error("Delimiter must not be empty")]
    EmptyDelimiter,

    #[error("Missing environment variable {0} (required by the {1} provider)")]
    MissingCredential(String, &'static str),

    #[error("Provider '{0}' is not usable: {1}")]
    Provider(String, String),
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input '{0}' has no header row")]
    NoColumns(PathBuf),

    #[error("Text column '{0}' not found in input")]
    UnknownColumn(String),

    #[error("Batch {index} is out of range ({batches} batches)")]
    BatchOutOfRange { index: usize, batches: usize },
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    Response(String),
}

impl ProviderError {
    /// Client errors other than timeouts and rate limits fail the same way on every attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            _ => true,
        }
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to open output '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in output: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write output: {0}")]
    Write(std::io::Error),

    #[error("Failed to sync output: {0}")]
    Sync(std::io::Error),

    #[error("Existing output '{0}' has a different header; refusing to resume")]
    HeaderMismatch(PathBuf),

    #[error("Failed to write summary: {0}")]
    WriteSummary(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ProviderError {
        ProviderError::Status {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(status(408).is_retryable());
        assert!(status(429).is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(ProviderError::Timeout(std::time::Duration::from_secs(1)).is_retryable());
        assert!(ProviderError::Response("no candidates".to_string()).is_retryable());
    }
}
