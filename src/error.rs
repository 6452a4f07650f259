// SPDX-License-Identifier: Apache-2.0
//! Error types for loading configuration and sending mail.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single failed schema rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Joins violations into one diagnostic line.
fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file was not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}: {message}", path.display())]
    Parse {
        path: PathBuf,
        message: String,
    },

    #[error("invalid configuration in {}: {}", path.display(), join_violations(violations))]
    Invalid {
        path: PathBuf,
        violations: Vec<Violation>,
    },
}

impl ConfigError {
    /// Field violations, empty for anything but `Invalid`.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ConfigError::Invalid { violations, .. } => violations.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid {role} address {value:?}: {reason}")]
    Address {
        role: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_violation() {
        let err = ConfigError::Invalid {
            path: PathBuf::from("config.json"),
            violations: vec![
                Violation {
                    field: "smtpHost",
                    message: "must not be empty".into(),
                },
                Violation {
                    field: "smtpPort",
                    message: "must be a positive number".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("smtpHost: must not be empty"));
        assert!(text.contains("smtpPort: must be a positive number"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn not_found_names_path() {
        let err = ConfigError::NotFound {
            path: PathBuf::from("/nope/config.json"),
        };
        assert!(err.to_string().contains("/nope/config.json"));
        assert!(err.violations().is_empty());
    }

    #[test]
    fn address_error_display() {
        let err = SendError::Address {
            role: "sender",
            value: "not-an-address".into(),
            reason: "missing @".into(),
        };
        let text = err.to_string();
        assert!(text.contains("sender"));
        assert!(text.contains("not-an-address"));
    }
}
