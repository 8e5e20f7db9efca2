//! Regex checks for user supplied URLs, mail addresses and phone numbers.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use crate::error::{ErrorCode, Result, WlmError};

const URL_PATTERN: &str = r"(?i)^(?:https?://)?[\w.-]+(?:\.[\w.-]+)+[\w\-._~:/?#\[\]@!$&'()*+,;=]+$";

const PHONE_NUMBER_PATTERN: &str =
    r"(\d{3}[-.\s]??\d{3}[-.\s]??\d{3}|\(\d{3}\)\s*\d{3}[-.\s]??\d{3}|\d{3}[-.\s]??\d{3})";

const MAIL_PATTERN: &str = r#"(?i)(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:2(?:5[0-5]|[0-4][0-9])|1[0-9][0-9]|[1-9]?[0-9])\.){3}(?:(?:2(?:5[0-5]|[0-4][0-9])|1[0-9][0-9]|[1-9]?[0-9])|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Url,
    Mail,
    PhoneNumber,
}

impl ValidationKind {
    fn pattern(self) -> &'static str {
        match self {
            ValidationKind::Url => URL_PATTERN,
            ValidationKind::Mail => MAIL_PATTERN,
            ValidationKind::PhoneNumber => PHONE_NUMBER_PATTERN,
        }
    }

    fn error_code(self) -> ErrorCode {
        match self {
            ValidationKind::Url => ErrorCode::E601,
            ValidationKind::Mail => ErrorCode::E602,
            ValidationKind::PhoneNumber => ErrorCode::E603,
        }
    }

    fn error_message(self, value: &str) -> String {
        match self {
            ValidationKind::Url => format!("invalid URL: {}", value),
            ValidationKind::Mail => format!("invalid mail address: {}", value),
            ValidationKind::PhoneNumber => format!("invalid phone number: {}", value),
        }
    }
}

impl FromStr for ValidationKind {
    type Err = WlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(ValidationKind::Url),
            "mail" => Ok(ValidationKind::Mail),
            "phone_number" => Ok(ValidationKind::PhoneNumber),
            other => Err(WlmError::config(format!("no validation rule for kind '{}'", other))),
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationKind::Url => "url",
            ValidationKind::Mail => "mail",
            ValidationKind::PhoneNumber => "phone_number",
        };
        f.write_str(name)
    }
}

/// Compiled patterns for every [`ValidationKind`], built once per run.
pub struct Validator {
    url: Regex,
    mail: Regex,
    phone_number: Regex,
}

impl Validator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            url: Regex::new(ValidationKind::Url.pattern())?,
            mail: Regex::new(ValidationKind::Mail.pattern())?,
            phone_number: Regex::new(ValidationKind::PhoneNumber.pattern())?,
        })
    }

    /// Returns `Ok(true)` on a match; a mismatch is always an error, never `Ok(false)`.
    pub fn is_valid(&self, kind: ValidationKind, value: &str) -> Result<bool> {
        let regex = match kind {
            ValidationKind::Url => &self.url,
            ValidationKind::Mail => &self.mail,
            ValidationKind::PhoneNumber => &self.phone_number,
        };
        if regex.is_match(value) {
            Ok(true)
        } else {
            Err(WlmError::validation(kind.error_code(), kind.error_message(value)))
        }
    }

    /// Same as [`Validator::is_valid`] with the kind given by name.
    pub fn is_valid_named(&self, kind: &str, value: &str) -> Result<bool> {
        self.is_valid(kind.parse()?, value)
    }
}
