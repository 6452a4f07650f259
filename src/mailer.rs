// SPDX-License-Identifier: Apache-2.0
use lettre::message::{header, Mailbox, Mailboxes, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::SendError;
use crate::transport::{TransportMode, TransportOptions};

/// A single plain-text message as given on the command line.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub from: String,
    /// One address or a comma-separated list
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// What the server and the envelope said about a completed send.
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub message_id: Option<String>,
    pub envelope_from: Option<String>,
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub response_code: String,
    pub response: Vec<String>,
}

/// Send capability bound to fixed transport options.
#[derive(Debug, Clone)]
pub struct Mailer {
    options: TransportOptions,
}

impl Mailer {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn mode(&self) -> TransportMode {
        if self.options.auth.is_some() {
            TransportMode::Authenticated
        } else {
            TransportMode::Anonymous
        }
    }

    /// Implicit TLS when `secure`, with the configured certificate checks.
    fn tls(&self) -> Result<Tls, SendError> {
        if !self.options.secure {
            return Ok(Tls::None);
        }

        let tls = &self.options.tls;
        let parameters = TlsParameters::builder(self.options.host.clone())
            .dangerous_accept_invalid_certs(tls.accept_invalid_certs)
            .dangerous_accept_invalid_hostnames(tls.accept_invalid_hostnames)
            .build()?;
        Ok(Tls::Wrapper(parameters))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, SendError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.options.host)
                .port(self.options.port)
                .tls(self.tls()?);

        if let Some(auth) = &self.options.auth {
            let credentials = Credentials::new(auth.user.clone(), auth.pass.clone());
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }

    /// Performs exactly one SMTP submission.
    #[instrument(
        skip(self, mail),
        fields(host = %self.options.host, port = self.options.port, mode = %self.mode())
    )]
    pub async fn send(&self, mail: &OutgoingMail) -> Result<SendReport, SendError> {
        let message = build_message(mail)?;
        let message_id = message.headers().get_raw("Message-ID").map(str::to_owned);
        let envelope = message.envelope().clone();

        let transport = self.transport()?;
        info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            "Sending email"
        );
        let response = transport.send(message).await?;

        let report = SendReport {
            message_id,
            envelope_from: envelope.from().map(ToString::to_string),
            accepted: envelope.to().iter().map(ToString::to_string).collect(),
            rejected: Vec::new(),
            response_code: response.code().to_string(),
            response: response.message().map(str::to_owned).collect(),
        };
        info!(code = %report.response_code, "Email sent");
        Ok(report)
    }
}

/// Builds the plain-text message with a generated Message-ID.
pub fn build_message(mail: &OutgoingMail) -> Result<Message, SendError> {
    let from: Mailbox = mail.from.parse().map_err(|e| SendError::Address {
        role: "sender",
        value: mail.from.clone(),
        reason: format!("{e}"),
    })?;

    let to: Mailboxes = mail.to.parse().map_err(|e| SendError::Address {
        role: "recipient",
        value: mail.to.clone(),
        reason: format!("{e}"),
    })?;
    if to.iter().next().is_none() {
        return Err(SendError::Address {
            role: "recipient",
            value: mail.to.clone(),
            reason: "no recipients given".into(),
        });
    }

    let mut builder = Message::builder()
        .from(from)
        .subject(mail.subject.as_str())
        .header(header::ContentType::TEXT_PLAIN)
        .message_id(None);
    for mailbox in to {
        builder = builder.to(mailbox);
    }

    Ok(builder.body(mail.text.clone())?)
}
