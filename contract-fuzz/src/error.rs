// contract-fuzz/src/error.rs
//! Error types used across the engine

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures while reading or validating configuration inputs
/// (security DSL entries, strings files, custom mutator files, engine config)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing required keys: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("Unknown mutator type: {0}")]
    UnknownMutatorType(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Failures surfaced by the execution boundary for a single case
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                ConfigError::MissingKeys(vec!["description".to_string()]),
                "Missing required keys: [\"description\"]",
            ),
            (
                ConfigError::UnknownMutatorType("shuffle".to_string()),
                "Unknown mutator type: shuffle",
            ),
            (
                ConfigError::InvalidValue {
                    key: "max_duration".to_string(),
                    reason: "bad".to_string(),
                },
                "Invalid value for max_duration: bad",
            ),
        ];

        for (error, expected_message) in errors {
            assert_eq!(error.to_string(), expected_message);
        }

        assert_eq!(
            ExecutionError::Transport("connection refused".to_string()).to_string(),
            "Transport error: connection refused"
        );
    }
}
