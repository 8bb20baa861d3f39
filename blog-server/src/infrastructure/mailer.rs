//! Outbound mail.
//!
//! The share form hands a fully composed [`OutgoingMail`] to a [`Mailer`].
//! `SmtpMailer` delivers through an SMTP relay; `LogMailer` only writes the
//! message to the log, which is what development setups use by default.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::infrastructure::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("could not build message: {0}")]
    Build(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

pub fn build_mailer(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    let mailer: Arc<dyn Mailer> = match config {
        MailConfig::Log { .. } => Arc::new(LogMailer),
        MailConfig::Smtp {
            host,
            port,
            username,
            password,
            starttls,
            ..
        } => {
            let builder = if *starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            };
            let mut builder = builder.port(*port);
            if let (Some(username), Some(password)) = (username, password) {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }
            info!(host = %host, port, starttls, "using SMTP mailer");
            Arc::new(SmtpMailer {
                transport: builder.build(),
            })
        }
    };
    Ok(mailer)
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse::<Mailbox>().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn to_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&mail.from)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    for recipient in &mail.to {
        builder = builder.to(mailbox(recipient)?);
    }
    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(mailbox(reply_to)?);
    }
    builder
        .body(mail.body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, mail), fields(recipients = mail.to.len()))]
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = to_message(&mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!(code = %response.code(), "mail accepted by relay");
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        // same address checks as a real delivery
        to_message(&mail)?;
        info!(
            subject = %mail.subject,
            recipients = mail.to.len(),
            "mail not sent (log backend)"
        );
        debug!(body = %mail.body, "mail body");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Keeps every message instead of sending it; optionally fails every send.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub(crate) sent: Mutex<Vec<OutgoingMail>>,
        pub(crate) fail: bool,
    }

    impl RecordingMailer {
        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub(crate) async fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            self.sent.lock().await.push(mail);
            Ok(())
        }
    }
}
