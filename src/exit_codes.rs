// SPDX-License-Identifier: Apache-2.0
//! Process exit codes for smtp-send.
//!
//! - 0: help shown or mail sent
//! - 1: configuration file missing, unreadable or unparsable
//! - 2: configuration failed validation
//! - 3: the send itself failed
//! - 64: bad command line (sysexits `EX_USAGE`)

use crate::error::{ConfigError, SendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    ConfigLoad = 1,
    ConfigInvalid = 2,
    SendFailed = 3,
    Usage = 64,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::NotFound { .. }
            | ConfigError::Read { .. }
            | ConfigError::Parse { .. } => ExitCode::ConfigLoad,
            ConfigError::Invalid { .. } => ExitCode::ConfigInvalid,
        }
    }
}

impl From<&SendError> for ExitCode {
    fn from(_: &SendError) -> Self {
        ExitCode::SendFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_errors_map_to_distinct_codes() {
        let missing = ConfigError::NotFound {
            path: PathBuf::from("config.json"),
        };
        let parse = ConfigError::Parse {
            path: PathBuf::from("config.json"),
            message: "eof".into(),
        };
        let invalid = ConfigError::Invalid {
            path: PathBuf::from("config.json"),
            violations: vec![],
        };

        assert_eq!(ExitCode::from(&missing).as_i32(), 1);
        assert_eq!(ExitCode::from(&parse).as_i32(), 1);
        assert_eq!(ExitCode::from(&invalid).as_i32(), 2);
    }

    #[test]
    fn send_errors_are_distinct_from_config_errors() {
        let err = SendError::Address {
            role: "sender",
            value: "x".into(),
            reason: "bad".into(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::SendFailed);
        assert_ne!(ExitCode::SendFailed.as_i32(), ExitCode::ConfigInvalid.as_i32());
    }
}
