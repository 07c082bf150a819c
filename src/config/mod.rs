mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use crate::runner::BatchOptions;
use defaults::*;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "chatgrade.yaml";

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            output: default_output(),
            batch_size: default_batch_size(),
            delimiter: default_delimiter(),
            batch_delay_ms: default_batch_delay_ms(),
            text_column: None,
            write_bom: true,
            summary: true,
            provider: Provider::default(),
            providers: ProvidersConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load an explicitly requested file, or the default file when it exists
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version, CONFIG_VERSION));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.delimiter.trim().is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(())
    }

    /// Pipeline knobs, checked
    pub fn batch_options(&self) -> Result<BatchOptions, ConfigError> {
        self.validate()?;
        let batch_size = NonZeroUsize::new(self.batch_size).ok_or(ConfigError::ZeroBatchSize)?;
        Ok(BatchOptions {
            batch_size,
            delimiter: self.delimiter.clone(),
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.delimiter, "-----");
        assert_eq!(config.batch_delay_ms, 1000);
        assert_eq!(config.provider, Provider::Gemini);
        assert!(config.write_bom);
        assert!(config.text_column.is_none());
    }

    #[test]
    fn test_parse_yaml_overrides() {
        let yaml = r#"
batch_size: 25
delimiter: "=====#"
provider: command
providers:
  command:
    program: ./fake-llm.sh
    args: ["--fast"]
retry:
  max_attempts: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.delimiter, "=====#");
        assert_eq!(config.provider, Provider::Command);
        assert_eq!(config.providers.command.args, vec!["--fast"]);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.backoff_base_ms, 1000);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = Config {
            batch_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBatchSize)));
        assert!(config.batch_options().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let config: Config = serde_yaml::from_str("version: 2").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedVersion(2, 1))
        ));
        let config: Config = serde_yaml::from_str("version: 1").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_delimiter() {
        let config = Config {
            delimiter: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDelimiter)));
    }

    #[test]
    fn test_batch_options() {
        let options = Config::default().batch_options().unwrap();
        assert_eq!(options.batch_size.get(), 10);
        assert_eq!(options.batch_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!("claude-cli".parse::<Provider>().unwrap(), Provider::ClaudeCli);
        assert_eq!("Command".parse::<Provider>().unwrap(), Provider::Command);
        assert!("openai".parse::<Provider>().is_err());
    }
}
