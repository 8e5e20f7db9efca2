use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;
use std::time::Duration;
use crate::config::{MailConfig, DEFAULT_SMTP_PORT};
use crate::error::{ErrorCode, Result, WlmError};
use crate::notify::{mail_body, resolve_recipient, Notifier, MAIL_SUBJECT};
use crate::output::Logger;

/// SMTP notifier. Every `send` runs inside its own [`MailSession`].
pub struct SmtpMailer<'a> {
    config: MailConfig,
    timeout: Duration,
    logger: &'a Logger,
}

impl<'a> SmtpMailer<'a> {
    pub fn new(config: MailConfig, timeout: Duration, logger: &'a Logger) -> Self {
        Self { config, timeout, logger }
    }

    fn sender(&self) -> Result<&str> {
        self.config
            .sender
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WlmError::transport(ErrorCode::E700, "mail sender address is not configured".to_string()))
    }
}

impl Notifier for SmtpMailer<'_> {
    fn channel(&self) -> &'static str {
        "mail"
    }

    fn send(&self, place: usize, total: usize, recipient: Option<&str>) -> Result<String> {
        let recipient = resolve_recipient(recipient, self.config.default_recipient.as_deref(), self.channel())?;
        let sender = self.sender()?;
        let message = build_message(sender, &recipient, place, total)?;

        let mut session = MailSession::open(&self.config, sender, self.timeout, self.logger)?;
        session.deliver(&message)?;
        Ok(recipient)
    }
}

pub fn build_message(sender: &str, recipient: &str, place: usize, total: usize) -> Result<Message> {
    let from: Mailbox = sender.parse()?;
    let to: Mailbox = recipient.parse()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(MAIL_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(mail_body(place, total))?;
    Ok(message)
}

/// Authenticated STARTTLS connection to the relay. Dropping the guard ends the SMTP
/// dialogue with `QUIT`, on success and on every error after the connect.
struct MailSession<'a> {
    connection: SmtpConnection,
    server: String,
    logger: &'a Logger,
}

impl<'a> MailSession<'a> {
    fn open(config: &MailConfig, sender: &str, timeout: Duration, logger: &'a Logger) -> Result<Self> {
        let server = config
            .smtp_server
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| WlmError::transport(ErrorCode::E700, "SMTP server is not configured".to_string()))?;
        let port = config.smtp_port.unwrap_or(DEFAULT_SMTP_PORT);
        let hello = ClientId::default();

        let connection = SmtpConnection::connect((server.as_str(), port), Some(timeout), &hello, None, None)?;
        let mut session = Self { connection, server, logger };

        if !session.connection.can_starttls() {
            return Err(WlmError::transport(
                ErrorCode::E701,
                format!("{} does not offer STARTTLS", session.server),
            ));
        }
        let tls = TlsParameters::new(session.server.clone())?;
        session.connection.starttls(&tls, &hello)?;

        let credentials = Credentials::new(sender.to_string(), config.password.clone().unwrap_or_default());
        session
            .connection
            .auth(&[Mechanism::Plain, Mechanism::Login], &credentials)?;
        logger.verbose(&format!("Logged in to {} as {}", session.server, sender));

        Ok(session)
    }

    fn deliver(&mut self, message: &Message) -> Result<()> {
        self.connection.send(message.envelope(), &message.formatted())?;
        Ok(())
    }
}

impl Drop for MailSession<'_> {
    fn drop(&mut self) {
        if self.connection.quit().is_err() {
            self.connection.abort();
        }
        self.logger.verbose(&format!("Closed SMTP session with {}", self.server));
    }
}
