use std::fs;
use std::path::Path;
use crate::config::Config;
use crate::error::{Result, WlmError};
use crate::output::Logger;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ~/.wlmrc

# Directory for log.txt (latest result) and the daily wlm_YYYY_MM_DD.log
output_dir = "logs"

# Per-page fetch timeout in seconds
timeout_secs = 30

# Send an SMS as well when a competitor loads this many times faster
sms_factor = 2

# Suppress output
quiet = false

# Verbose output
verbose = false

# SMTP settings for mail notifications.
# SMTP_SERVER, SMTP_PORT, EMAIL, PASSWORD and DEFAULT_RECIPIENT_MAIL_ADDRESS
# environment variables override these.
[mail]
smtp_server = "smtp.example.com"
smtp_port = 587
sender = "alerts@example.com"
password = ""
default_recipient = "me@example.com"

# Twilio settings for SMS notifications.
# TWILIO_ACCOUNT_ID, TWILIO_TOKEN, TWILIO_FROM_NUMBER and
# DEFAULT_RECIPIENT_PHONE_NUMBER environment variables override these.
[sms]
account_id = ""
token = ""
from_number = ""
default_recipient = ""
dummy = true      # print SMS messages instead of sending them

# Logging configuration
[logging]
format = "text"   # Output format: "text" or "json"
level = "info"    # Log level: "debug", "info", "warn", "error"
"#;

/// Initialize a default configuration file at ~/.wlmrc
pub fn init_config(logger: &Logger) -> Result<()> {
    let config_path = Config::default_path()?;
    write_template(&config_path, logger)
}

pub fn write_template(config_path: &Path, logger: &Logger) -> Result<()> {
    if fs::metadata(config_path).is_ok() {
        logger.warn(&format!("Configuration file already exists at {}", config_path.display()));
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| WlmError::config(format!("Failed to write config file {}: {}", config_path.display(), e)))?;

    logger.info(&format!("Created configuration template at {}", config_path.display()));
    Ok(())
}
