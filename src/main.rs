// SPDX-License-Identifier: Apache-2.0
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};

use smtp_send::cli::{usage, Cli, Command, SendArgs};
use smtp_send::config::ConfigLoader;
use smtp_send::exit_codes::ExitCode;
use smtp_send::logging;
use smtp_send::transport::TransportSelector;

const APP_NAME: &str = "smtp_send";

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::Usage,
            };
            let _ = err.print();
            return code.into();
        }
    };

    if let Err(err) = logging::init_from_env(APP_NAME) {
        eprintln!("Failed to set tracing subscriber: {}", err);
    }

    let code = match cli.command {
        Some(Command::Send(args)) => send(args).await,
        Some(Command::Help) | None => {
            println!("{}", usage());
            ExitCode::Success
        }
    };
    code.into()
}

/// Load config, build the transport, send once and print the result
async fn send(args: SendArgs) -> ExitCode {
    let loader = ConfigLoader::beside_executable();
    let config = match loader.load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            for violation in err.violations() {
                error!(field = violation.field, "{}", violation.message);
            }
            return ExitCode::from(&err);
        }
    };

    let mailer = TransportSelector::build(&config);
    let mail = args.mail();

    match mailer.send(&mail).await {
        Ok(report) => {
            info!("Sent result");
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{:?}", report),
            }
            ExitCode::Success
        }
        Err(err) => {
            error!("Failed to send email: {}", err);
            ExitCode::from(&err)
        }
    }
}
