// SPDX-License-Identifier: Apache-2.0
pub mod cli;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod mailer;
pub mod transport;
pub mod validate;

pub use config::{Config, ConfigLoader};
pub use error::{ConfigError, SendError, Violation};
pub use exit_codes::ExitCode;
pub use mailer::{Mailer, OutgoingMail, SendReport};
pub use transport::{TransportMode, TransportOptions, TransportSelector};
