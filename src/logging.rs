// SPDX-License-Identifier: Apache-2.0
use std::env;
use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry,
};

/// Selects the log output format: `json` for Bunyan, anything else for console
pub const LOG_FORMAT_ENV: &str = "SMTP_SEND_LOG_FORMAT";

fn env_filter(name: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info,lettre=warn", name)))
}

/// Initialize a Bunyan (JSON) tracing subscriber writing to `sink`
pub fn init_tracing<Sink>(name: &str, sink: Sink) -> Result<(), SetGlobalDefaultError>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // Skip setting LogTracer if it's already been set
    let _ = LogTracer::init();

    let formatting_layer = BunyanFormattingLayer::new(name.into(), sink);

    let subscriber = Registry::default()
        .with(env_filter(name))
        .with(JsonStorageLayer)
        .with(formatting_layer);

    set_global_default(subscriber)?;
    tracing::debug!("Tracing initialized with Bunyan formatter");
    Ok(())
}

/// Initialize a readable console logger on stderr
pub fn init_console_tracing(name: &str) -> Result<(), SetGlobalDefaultError> {
    let _ = LogTracer::init();

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(name))
        .finish();

    set_global_default(subscriber)?;
    tracing::debug!("Console tracing initialized");
    Ok(())
}

/// Picks the subscriber according to `SMTP_SEND_LOG_FORMAT`.
/// Logs always go to stderr so stdout only carries the send report.
pub fn init_from_env(name: &str) -> Result<(), SetGlobalDefaultError> {
    let json = env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        init_tracing(name, std::io::stderr)
    } else {
        init_console_tracing(name)
    }
}
