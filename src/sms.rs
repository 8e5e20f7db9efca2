use reqwest::blocking::Client;
use std::time::Duration;
use crate::config::{SmsConfig, DEFAULT_TWILIO_API_BASE};
use crate::error::{ErrorCode, ErrorKind, Result, WlmError};
use crate::notify::{resolve_recipient, sms_body, Notifier};
use crate::output::Logger;

/// Sends SMS through the Twilio REST API.
pub struct TwilioSmsSender<'a> {
    client: Client,
    api_base: String,
    account_id: String,
    token: String,
    from_number: String,
    default_recipient: Option<String>,
    logger: &'a Logger,
}

impl<'a> TwilioSmsSender<'a> {
    /// Returns `None` when the account id, token or sender number is missing.
    pub fn from_config(config: &SmsConfig, timeout: Duration, logger: &'a Logger) -> Result<Option<Self>> {
        let (Some(account_id), Some(token), Some(from_number)) = (
            non_empty(&config.account_id),
            non_empty(&config.token),
            non_empty(&config.from_number),
        ) else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport_error("building SMS client", e))?;

        Ok(Some(Self {
            client,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
            account_id,
            token,
            from_number,
            default_recipient: config.default_recipient.clone(),
            logger,
        }))
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_id
        )
    }
}

impl Notifier for TwilioSmsSender<'_> {
    fn channel(&self) -> &'static str {
        "sms"
    }

    fn send(&self, place: usize, total: usize, recipient: Option<&str>) -> Result<String> {
        let recipient = resolve_recipient(recipient, self.default_recipient.as_deref(), self.channel())?;
        let body = sms_body(place, total, &recipient);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_id, Some(&self.token))
            .form(&[
                ("To", recipient.as_str()),
                ("From", self.from_number.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .map_err(|e| transport_error("sending SMS", e))?;

        let status = response.status();
        let payload = response
            .text()
            .map_err(|e| transport_error("reading SMS API response", e))?;
        if !status.is_success() {
            return Err(WlmError::transport(
                ErrorCode::E702,
                format!("SMS API answered {}: {}", status, payload),
            ));
        }

        let sid = serde_json::from_str::<serde_json::Value>(&payload)
            .ok()
            .and_then(|v| v.get("sid").and_then(|s| s.as_str()).map(str::to_string))
            .unwrap_or_default();
        self.logger.verbose(&format!("SMS accepted with sid {}", sid));

        Ok(recipient)
    }
}

/// Prints the SMS instead of sending it; used when no SMS credentials exist.
pub struct DummySmsSender<'a> {
    default_recipient: Option<String>,
    logger: &'a Logger,
}

impl<'a> DummySmsSender<'a> {
    pub fn new(default_recipient: Option<String>, logger: &'a Logger) -> Self {
        Self { default_recipient, logger }
    }

    pub fn render(&self, place: usize, total: usize, recipient: &str) -> String {
        format!(
            "############## Dummy sms ##############\n{}#######################################",
            sms_body(place, total, recipient)
        )
    }
}

impl Notifier for DummySmsSender<'_> {
    fn channel(&self) -> &'static str {
        "sms"
    }

    fn send(&self, place: usize, total: usize, recipient: Option<&str>) -> Result<String> {
        let recipient = resolve_recipient(recipient, self.default_recipient.as_deref(), self.channel())
            .unwrap_or_else(|_| "not set".to_string());
        let text = self.render(place, total, &recipient);
        println!("{}", text);
        self.logger.verbose(&format!("SMS message: {}", sms_body(place, total, &recipient)));
        Ok(recipient)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn transport_error(action: &str, err: reqwest::Error) -> WlmError {
    WlmError::with_source(
        ErrorCode::E702,
        ErrorKind::Transport,
        format!("Notification error: {}: {}", action, err),
        Box::new(err),
    )
}
