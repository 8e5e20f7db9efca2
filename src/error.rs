use std::fmt;

#[derive(Debug)]
pub struct WlmError {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Fetch,
    Config,
    Validation,
    Transport,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // E1xx: I/O errors
    E100, // General I/O error
    E103, // Directory creation failed
    E104, // File write error

    // E2xx: HTTP errors
    E200, // General HTTP error
    E201, // Connection timeout
    E202, // HTTP client error (4xx)
    E203, // HTTP server error (5xx)
    E204, // Invalid URL
    E206, // Non-text response

    // E3xx: Configuration errors
    E300, // General config error
    E302, // Invalid config format
    E303, // Missing required config
    E304, // Invalid config value

    // E4xx: Network errors
    E400, // General network error
    E403, // Connection refused

    // E5xx: Internal errors
    E500, // General internal error

    // E6xx: Input validation errors
    E601, // Invalid URL input
    E602, // Invalid mail address
    E603, // Invalid phone number

    // E7xx: Notification transport errors
    E700, // General notification error
    E701, // Mail delivery failed
    E702, // SMS delivery failed
    E703, // No recipient configured
}

impl fmt::Display for WlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code_num = match self {
            ErrorCode::E100 => 100,
            ErrorCode::E103 => 103,
            ErrorCode::E104 => 104,
            ErrorCode::E200 => 200,
            ErrorCode::E201 => 201,
            ErrorCode::E202 => 202,
            ErrorCode::E203 => 203,
            ErrorCode::E204 => 204,
            ErrorCode::E206 => 206,
            ErrorCode::E300 => 300,
            ErrorCode::E302 => 302,
            ErrorCode::E303 => 303,
            ErrorCode::E304 => 304,
            ErrorCode::E400 => 400,
            ErrorCode::E403 => 403,
            ErrorCode::E500 => 500,
            ErrorCode::E601 => 601,
            ErrorCode::E602 => 602,
            ErrorCode::E603 => 603,
            ErrorCode::E700 => 700,
            ErrorCode::E701 => 701,
            ErrorCode::E702 => 702,
            ErrorCode::E703 => 703,
        };
        write!(f, "E{:03}", code_num)
    }
}

impl ErrorCode {
    /// Returns a concise human-readable message for the error code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "General I/O error",
            ErrorCode::E103 => "Directory creation failed",
            ErrorCode::E104 => "File write error",

            ErrorCode::E200 => "HTTP request failed",
            ErrorCode::E201 => "Connection timeout",
            ErrorCode::E202 => "HTTP client error",
            ErrorCode::E203 => "HTTP server error",
            ErrorCode::E204 => "Invalid URL",
            ErrorCode::E206 => "Response is not a text document",

            ErrorCode::E300 => "Configuration error",
            ErrorCode::E302 => "Invalid config format",
            ErrorCode::E303 => "Missing required config",
            ErrorCode::E304 => "Invalid config value",

            ErrorCode::E400 => "Network error",
            ErrorCode::E403 => "Connection refused",

            ErrorCode::E500 => "Internal error",

            ErrorCode::E601 => "Invalid URL",
            ErrorCode::E602 => "Invalid mail address",
            ErrorCode::E603 => "Invalid phone number",

            ErrorCode::E700 => "Notification failed",
            ErrorCode::E701 => "Mail delivery failed",
            ErrorCode::E702 => "SMS delivery failed",
            ErrorCode::E703 => "No notification recipient",
        }
    }

    /// Returns a troubleshooting hint for the error code
    pub fn hint(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "Check file permissions and disk space",
            ErrorCode::E103 => "Check parent directory permissions and disk space",
            ErrorCode::E104 => "Ensure sufficient disk space and write permissions",

            ErrorCode::E200 => "Check URL validity and server status",
            ErrorCode::E201 => "Check internet connection or raise --timeout",
            ErrorCode::E202 => "Verify the page address exists",
            ErrorCode::E203 => "Server is experiencing issues, try again later",
            ErrorCode::E204 => "Include the http:// or https:// scheme",
            ErrorCode::E206 => "Measure HTML pages, not binary downloads",

            ErrorCode::E300 => "Check configuration file syntax",
            ErrorCode::E302 => "Validate TOML syntax in config file",
            ErrorCode::E303 => "Add required configuration values or run with --init",
            ErrorCode::E304 => "Check config value format and constraints",

            ErrorCode::E400 => "Check internet connection and network settings",
            ErrorCode::E403 => "Check if the site is up and accessible",

            ErrorCode::E500 => "Report this issue with debug information",

            ErrorCode::E601 => "Pass a full address such as https://example.com",
            ErrorCode::E602 => "Pass an address such as name@example.com",
            ErrorCode::E603 => "Pass digits such as 123-456-789",

            ErrorCode::E700 => "Check notification settings in ~/.wlmrc",
            ErrorCode::E701 => "Check SMTP server, port and credentials",
            ErrorCode::E702 => "Check SMS account id, token and sender number",
            ErrorCode::E703 => "Pass --mail/--phone_number or set a default recipient",
        }
    }
}

impl std::error::Error for WlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|boxed| &**boxed as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for WlmError {
    fn from(err: std::io::Error) -> Self {
        WlmError {
            code: ErrorCode::E100,
            kind: ErrorKind::Io,
            message: format!("I/O error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for WlmError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::E201
        } else if err.is_connect() {
            ErrorCode::E403
        } else if let Some(status) = err.status() {
            if status.is_server_error() {
                ErrorCode::E203
            } else {
                ErrorCode::E202
            }
        } else if err.is_builder() {
            ErrorCode::E204
        } else {
            ErrorCode::E200
        };
        WlmError {
            code,
            kind: ErrorKind::Fetch,
            message: format!("HTTP error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for WlmError {
    fn from(err: toml::de::Error) -> Self {
        WlmError {
            code: ErrorCode::E302,
            kind: ErrorKind::Config,
            message: format!("Configuration error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::env::VarError> for WlmError {
    fn from(err: std::env::VarError) -> Self {
        WlmError {
            code: ErrorCode::E300,
            kind: ErrorKind::Config,
            message: format!("Environment variable error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<url::ParseError> for WlmError {
    fn from(err: url::ParseError) -> Self {
        WlmError {
            code: ErrorCode::E204,
            kind: ErrorKind::Fetch,
            message: format!("URL parse error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<regex::Error> for WlmError {
    fn from(err: regex::Error) -> Self {
        WlmError {
            code: ErrorCode::E500,
            kind: ErrorKind::Internal,
            message: format!("Pattern compile error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<lettre::address::AddressError> for WlmError {
    fn from(err: lettre::address::AddressError) -> Self {
        WlmError {
            code: ErrorCode::E701,
            kind: ErrorKind::Transport,
            message: format!("Mail address error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<lettre::error::Error> for WlmError {
    fn from(err: lettre::error::Error) -> Self {
        WlmError {
            code: ErrorCode::E701,
            kind: ErrorKind::Transport,
            message: format!("Mail build error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<lettre::transport::smtp::Error> for WlmError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        WlmError {
            code: ErrorCode::E701,
            kind: ErrorKind::Transport,
            message: format!("SMTP error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

// Helper methods for creating errors
impl WlmError {
    pub fn new(code: ErrorCode, kind: ErrorKind, message: String) -> Self {
        WlmError {
            code,
            kind,
            message,
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        kind: ErrorKind,
        message: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        WlmError {
            code,
            kind,
            message,
            source: Some(source),
        }
    }

    pub fn config(msg: String) -> Self {
        Self::new(ErrorCode::E300, ErrorKind::Config, format!("Configuration error: {}", msg))
    }

    pub fn missing_config(msg: String) -> Self {
        Self::new(ErrorCode::E303, ErrorKind::Config, format!("Missing configuration: {}", msg))
    }

    pub fn fetch(code: ErrorCode, msg: String) -> Self {
        Self::new(code, ErrorKind::Fetch, msg)
    }

    pub fn validation(code: ErrorCode, msg: String) -> Self {
        Self::new(code, ErrorKind::Validation, msg)
    }

    pub fn transport(code: ErrorCode, msg: String) -> Self {
        Self::new(code, ErrorKind::Transport, format!("Notification error: {}", msg))
    }

    pub fn file_write(msg: String) -> Self {
        Self::new(ErrorCode::E104, ErrorKind::Io, format!("File write error: {}", msg))
    }

    /// Notification failures are best-effort; everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        self.kind != ErrorKind::Transport
    }

    /// Add context to an existing error
    pub fn with_context(self, context: &str) -> Self {
        WlmError {
            code: self.code,
            kind: self.kind,
            message: format!("{}: {}", context, self.message),
            source: self.source,
        }
    }
}

impl From<String> for WlmError {
    fn from(msg: String) -> Self {
        Self::new(ErrorCode::E500, ErrorKind::Internal, msg)
    }
}

impl From<&str> for WlmError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorCode::E500, ErrorKind::Internal, msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WlmError>;

/// Trait for adding context to errors
pub trait WithContext<T> {
    /// Add context to the error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<WlmError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(&f()))
    }
}
