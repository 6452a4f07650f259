// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::CONFIG_PATH_ENV;
use crate::mailer::OutgoingMail;

/// Send a single email through an SMTP server described by a JSON config file
#[derive(Debug, Parser)]
#[command(name = "smtp-send", version, about, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print usage and exit
    Help,
    /// Send one email
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Sender address, e.g. "Alice <alice@example.com>"
    pub from: String,
    /// Recipient address or comma-separated list of addresses
    pub to: String,
    /// Subject line
    #[arg(allow_hyphen_values = true)]
    pub subject: String,
    /// Plain-text body
    #[arg(allow_hyphen_values = true)]
    pub text: String,
    /// Configuration file; defaults to config.json next to the executable
    #[arg(env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,
}

impl SendArgs {
    pub fn mail(&self) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: self.subject.clone(),
            text: self.text.clone(),
        }
    }
}

/// Rendered long help text.
pub fn usage() -> String {
    Cli::command().render_long_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_send_with_config_path() {
        let cli = Cli::try_parse_from([
            "smtp-send", "send", "a@example.com", "b@example.com", "Hi", "Body", "/etc/mail.json",
        ])
        .expect("valid args");
        let Some(Command::Send(args)) = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(args.config, Some(PathBuf::from("/etc/mail.json")));
        let mail = args.mail();
        assert_eq!(mail.from, "a@example.com");
        assert_eq!(mail.to, "b@example.com");
        assert_eq!(mail.subject, "Hi");
        assert_eq!(mail.text, "Body");
    }

    #[test]
    fn help_is_a_command() {
        let cli = Cli::try_parse_from(["smtp-send", "help"]).expect("valid args");
        assert!(matches!(cli.command, Some(Command::Help)));
    }

    #[test]
    fn no_command_is_accepted() {
        let cli = Cli::try_parse_from(["smtp-send"]).expect("valid args");
        assert!(cli.command.is_none());
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = Cli::try_parse_from(["smtp-send", "frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn send_requires_all_message_fields() {
        let err = Cli::try_parse_from(["smtp-send", "send", "a@example.com", "b@example.com"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn usage_mentions_send() {
        assert!(usage().contains("send"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
