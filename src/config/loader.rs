//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProbeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> ConfigResult<ProbeConfig> {
    let config: ProbeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> ConfigResult<ProbeConfig> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, RuntimeFlavor};

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            [logging]
            format = "compact"

            [requests.headers]
            accept = "application/json"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.filter, "route_probe=info");
        assert_eq!(config.runtime.flavor, RuntimeFlavor::CurrentThread);
        assert_eq!(config.requests.headers["accept"], "application/json");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[runtime]\nflavor = \"green_threads\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = parse_config(
            r#"
            [runtime]
            flavor = "multi_thread"
            worker_threads = 0
            body_limit_bytes = 0
            "#,
        )
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: "));
        assert!(msg.contains("worker_threads"));
        assert!(msg.contains("body_limit_bytes"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
