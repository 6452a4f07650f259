// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::mailer::Mailer;

/// Credentials attached to an authenticated transport.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthBlock {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for AuthBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthBlock")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Certificate checks applied during the TLS handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsOptions {
    pub accept_invalid_certs: bool,
    pub accept_invalid_hostnames: bool,
}

impl TlsOptions {
    /// Self-signed, expired and mismatched certificates are all accepted.
    pub const RELAXED: Self = Self {
        accept_invalid_certs: true,
        accept_invalid_hostnames: true,
    };
}

/// Everything needed to open an SMTP session, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte (SMTPS)
    pub secure: bool,
    pub tls: TlsOptions,
    pub auth: Option<AuthBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Authenticated,
    Anonymous,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Authenticated => f.write_str("authenticated"),
            TransportMode::Anonymous => f.write_str("anonymous"),
        }
    }
}

/// Maps a validated [`Config`] onto transport options.
pub struct TransportSelector;

impl TransportSelector {
    pub fn options(cfg: &Config) -> TransportOptions {
        let auth = if cfg.has_auth() {
            Some(AuthBlock {
                user: cfg.smtp_user().unwrap_or_default().to_owned(),
                pass: cfg.smtp_pass().unwrap_or_default().to_owned(),
            })
        } else {
            None
        };

        TransportOptions {
            host: cfg.smtp_host().to_owned(),
            port: cfg.smtp_port(),
            secure: true,
            tls: TlsOptions::RELAXED,
            auth,
        }
    }

    /// Builds the mailer. No connection is made until a send.
    #[instrument(skip(cfg), fields(host = %cfg.smtp_host(), port = cfg.smtp_port()))]
    pub fn build(cfg: &Config) -> Mailer {
        let options = Self::options(cfg);
        if options.tls.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for this transport");
        }
        let mailer = Mailer::new(options);
        info!(mode = %mailer.mode(), "Email transport created");
        mailer
    }
}
