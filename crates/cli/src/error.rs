//! Error types for the printloop CLI

use printloop_scheduler::SchedulerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot read config file {path}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::ConfigUnreadable { .. } => 2,
            CliError::InvalidConfiguration(_)
            | CliError::JsonError(_)
            | CliError::YamlError(_)
            | CliError::Scheduler(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let unreadable = CliError::ConfigUnreadable {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(unreadable.exit_code(), 2);
        assert_eq!(
            CliError::InvalidConfiguration("bad".to_string()).exit_code(),
            3
        );
        assert_eq!(
            CliError::from(SchedulerError::invalid_configuration("zero period")).exit_code(),
            3
        );
    }

    #[test]
    fn test_scheduler_error_message_is_transparent() {
        let err = CliError::from(SchedulerError::invalid_configuration("zero period"));
        insta::assert_snapshot!(err.to_string(), @"Invalid configuration: zero period");
    }
}
