use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::cli::{Args, LogFormat, LogLevel};
use crate::error::{ErrorCode, ErrorKind, Result, WlmError, WithContext};

pub const DEFAULT_OUTPUT_DIR: &str = "logs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMS_FACTOR: u32 = 2;
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub output_dir: Option<String>,
    pub timeout_secs: Option<u64>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub sms_factor: Option<u32>,
    pub mail: Option<MailConfig>,
    pub sms: Option<SmsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MailConfig {
    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub sender: Option<String>,
    pub password: Option<String>,
    pub default_recipient: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SmsConfig {
    pub account_id: Option<String>,
    pub token: Option<String>,
    pub from_number: Option<String>,
    pub default_recipient: Option<String>,
    pub dummy: Option<bool>,
    pub api_base: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub level: Option<String>,
}

impl Config {
    /// Path of the per-user configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .with_context(|| "reading HOME environment variable for config".to_string())?;
        Ok(PathBuf::from(home).join(".wlmrc"))
    }

    /// Load `path`, or `~/.wlmrc` when no path is given.
    /// A missing default file yields the default config; a missing explicit file is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    return Ok(Config::default());
                }
                Self::load_from_path(&path)
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Overlay credentials and default recipients from environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mail = self.mail.get_or_insert_with(MailConfig::default);
        if let Some(server) = lookup("SMTP_SERVER") {
            mail.smtp_server = Some(server);
        }
        if let Some(port) = lookup("SMTP_PORT") {
            let port = port.trim().parse::<u16>().map_err(|_| {
                WlmError::new(
                    ErrorCode::E304,
                    ErrorKind::Config,
                    format!("SMTP_PORT is not a port number: {}", port),
                )
            })?;
            mail.smtp_port = Some(port);
        }
        if let Some(sender) = lookup("EMAIL") {
            mail.sender = Some(sender);
        }
        if let Some(password) = lookup("PASSWORD") {
            mail.password = Some(password);
        }
        if let Some(recipient) = lookup("DEFAULT_RECIPIENT_MAIL_ADDRESS") {
            mail.default_recipient = Some(recipient);
        }

        let sms = self.sms.get_or_insert_with(SmsConfig::default);
        if let Some(account_id) = lookup("TWILIO_ACCOUNT_ID") {
            sms.account_id = Some(account_id);
        }
        if let Some(token) = lookup("TWILIO_TOKEN") {
            sms.token = Some(token);
        }
        if let Some(from) = lookup("TWILIO_FROM_NUMBER") {
            sms.from_number = Some(from);
        }
        if let Some(recipient) = lookup("DEFAULT_RECIPIENT_PHONE_NUMBER") {
            sms.default_recipient = Some(recipient);
        }
        Ok(())
    }

    /// Fill in CLI fields the user left at their defaults.
    pub fn merge_with_args(&self, args: &mut Args) {
        if args.output_dir.is_none() {
            args.output_dir = self.output_dir.clone();
        }
        if args.timeout.is_none() {
            args.timeout = self.timeout_secs;
        }
        if !args.quiet {
            args.quiet = self.quiet.unwrap_or(false);
        }
        if !args.verbose {
            args.verbose = self.verbose.unwrap_or(false);
        }
        if !args.dummy_sms {
            args.dummy_sms = self.sms.as_ref().and_then(|s| s.dummy).unwrap_or(false);
        }

        if let Some(logging_config) = &self.logging {
            if args.log_format.is_none() {
                args.log_format = logging_config.format.as_ref().and_then(|f| {
                    match f.to_lowercase().as_str() {
                        "json" => Some(LogFormat::Json),
                        "text" => Some(LogFormat::Text),
                        _ => None,
                    }
                });
            }
            if args.log_level.is_none() {
                args.log_level = logging_config.level.as_ref().and_then(|l| {
                    match l.to_lowercase().as_str() {
                        "debug" => Some(LogLevel::Debug),
                        "info" => Some(LogLevel::Info),
                        "warn" => Some(LogLevel::Warn),
                        "error" => Some(LogLevel::Error),
                        _ => None,
                    }
                });
            }
        }
    }

    pub fn sms_factor(&self) -> Result<u32> {
        match self.sms_factor {
            Some(0) => Err(WlmError::new(
                ErrorCode::E304,
                ErrorKind::Config,
                "sms_factor must be at least 1".to_string(),
            )),
            Some(factor) => Ok(factor),
            None => Ok(DEFAULT_SMS_FACTOR),
        }
    }
}

/// Settings resolved once at startup and handed to every collaborator.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub sms_factor: u32,
}

impl RunSettings {
    pub fn resolve(args: &Args, config: &Config) -> Result<Self> {
        Ok(Self {
            output_dir: PathBuf::from(
                args.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR),
            ),
            timeout: Duration::from_secs(args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            sms_factor: config.sms_factor()?,
        })
    }
}
