// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{ConfigError, Violation};
use crate::validate::{self, Checked, SMTP_HOST, SMTP_PASS, SMTP_PORT, SMTP_USER};

/// File name looked up in the base directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "SMTP_SEND_CONFIG";

/// Validated SMTP connection settings.
///
/// Only [`ConfigLoader`] and [`Config::from_document`] produce values of
/// this type, so holding one means every schema rule passed.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    smtp_host: String,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_pass: Option<String>,
}

impl Config {
    /// Coerces and validates an already parsed document.
    pub fn from_document(doc: &Value) -> Result<Self, Vec<Violation>> {
        let checked = validate::check_document(doc)?;
        Self::from_checked(&checked)
    }

    fn from_checked(checked: &Checked) -> Result<Self, Vec<Violation>> {
        // check_document already rejects documents missing either field
        let host = checked.string(SMTP_HOST);
        let port = checked.port(SMTP_PORT);
        let (Some(smtp_host), Some(smtp_port)) = (host, port) else {
            let missing = [(SMTP_HOST, host.is_none()), (SMTP_PORT, port.is_none())];
            return Err(missing
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(field, _)| Violation {
                    field,
                    message: "is required".into(),
                })
                .collect());
        };

        Ok(Self {
            smtp_host: smtp_host.to_owned(),
            smtp_port,
            smtp_user: checked.string(SMTP_USER).map(str::to_owned),
            smtp_pass: checked.string(SMTP_PASS).map(str::to_owned),
        })
    }

    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.smtp_user.as_deref()
    }

    pub fn smtp_pass(&self) -> Option<&str> {
        self.smtp_pass.as_deref()
    }

    /// Both user and password are present and non-empty.
    pub fn has_auth(&self) -> bool {
        matches!(
            (self.smtp_user(), self.smtp_pass()),
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty()
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Resolves, reads, parses and validates the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// `base_dir` is where `config.json` is looked up by default.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Loader rooted at the directory holding the running executable,
    /// falling back to the working directory.
    pub fn beside_executable() -> Self {
        let base_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base_dir)
    }

    pub fn default_path(&self) -> PathBuf {
        self.base_dir.join(DEFAULT_CONFIG_FILE)
    }

    /// An explicit path wins over the default one.
    pub fn resolve(&self, source: Option<&Path>) -> PathBuf {
        source
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_path())
    }

    #[instrument(skip(self))]
    pub fn load(&self, source: Option<&Path>) -> Result<Config, ConfigError> {
        let path = self.resolve(source);

        info!(path = %path.display(), "Checking configuration file exists");
        if !path.is_file() {
            return Err(ConfigError::NotFound { path });
        }

        info!(path = %path.display(), "Reading configuration file");
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let doc = parse_document(&path, &text)?;
        let config = Config::from_document(&doc)
            .map_err(|violations| ConfigError::Invalid {
                path: path.clone(),
                violations,
            })?;

        debug!(config = ?config, has_auth = config.has_auth(), "Configuration loaded");
        Ok(config)
    }
}

/// JSON by default, TOML when the file name says so.
fn parse_document(path: &Path, text: &str) -> Result<Value, ConfigError> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let parsed = if is_toml {
        toml::from_str::<Value>(text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<Value>(text).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(doc: Value) -> Config {
        Config::from_document(&doc).expect("valid config")
    }

    #[test]
    fn has_auth_requires_both_non_empty() {
        let base = json!({"smtpHost": "smtp.example.com", "smtpPort": 465});
        let with = |user: Option<&str>, pass: Option<&str>| {
            let mut doc = base.clone();
            if let Some(u) = user {
                doc["smtpUser"] = json!(u);
            }
            if let Some(p) = pass {
                doc["smtpPass"] = json!(p);
            }
            config(doc).has_auth()
        };

        assert!(with(Some("a"), Some("b")));
        assert!(!with(Some("a"), None));
        assert!(!with(None, Some("b")));
        assert!(!with(Some(""), Some("b")));
        assert!(!with(Some("a"), Some("")));
        assert!(!with(None, None));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = config(json!({
            "smtpHost": "smtp.example.com",
            "smtpPort": 465,
            "smtpUser": "alice",
            "smtpPass": "hunter2",
        }));
        let text = format!("{cfg:?}");
        assert!(text.contains("alice"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("<redacted>"));
    }

    #[test]
    fn explicit_path_wins_over_default() {
        let loader = ConfigLoader::new("/opt/smtp-send");
        assert_eq!(
            loader.resolve(None),
            PathBuf::from("/opt/smtp-send/config.json")
        );
        assert_eq!(
            loader.resolve(Some(Path::new("/etc/mail.json"))),
            PathBuf::from("/etc/mail.json")
        );
    }

    #[test]
    fn toml_documents_are_accepted() {
        let doc = parse_document(
            Path::new("mail.toml"),
            "smtpHost = \"smtp.example.com\"\nsmtpPort = 587\n",
        )
        .expect("toml parses");
        let cfg = config(doc);
        assert_eq!(cfg.smtp_port(), 587);
    }

    #[test]
    fn missing_checked_field_is_named() {
        let err = Config::from_checked(&Checked::default()).unwrap_err();
        let fields: Vec<_> = err.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec![SMTP_HOST, SMTP_PORT]);

        let mut checked = Checked::default();
        checked.insert(SMTP_HOST, json!("smtp.example.com"));
        let err = Config::from_checked(&checked).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].field, SMTP_PORT);
    }

    #[test]
    fn bracketed_ipv6_host_is_stored_bare() {
        let cfg = config(json!({"smtpHost": "[::1]", "smtpPort": 2525}));
        assert_eq!(cfg.smtp_host(), "::1");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_document(Path::new("config.json"), "{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
