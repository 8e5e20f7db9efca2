use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Local, Utc};
use crate::error::{ErrorCode, WlmError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLogRecord {
    pub ts: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Option<String>,
    pub message: String,
    pub context: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn severity(self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warn => 2,
            LogLevel::Error => 3,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<crate::cli::LogLevel> for LogLevel {
    fn from(level: crate::cli::LogLevel) -> Self {
        match level {
            crate::cli::LogLevel::Debug => LogLevel::Debug,
            crate::cli::LogLevel::Info => LogLevel::Info,
            crate::cli::LogLevel::Warn => LogLevel::Warn,
            crate::cli::LogLevel::Error => LogLevel::Error,
        }
    }
}

/// Name of the daily diagnostic log inside the output directory.
pub fn daily_log_file_name() -> String {
    format!("wlm_{}.log", Local::now().format("%Y_%m_%d"))
}

pub struct Logger {
    pub quiet: bool,
    pub verbose: bool,
    pub json_output: bool,
    pub min_level: LogLevel,
    log_file: Option<PathBuf>,
}

impl Logger {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self::new_with_json(quiet, verbose, false)
    }

    pub fn new_with_json(quiet: bool, verbose: bool, json_output: bool) -> Self {
        Self {
            quiet,
            verbose,
            json_output,
            min_level: LogLevel::Debug,
            log_file: None,
        }
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Mirror every record into `path`, regardless of quiet mode.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    fn log_structured(&self, level: LogLevel, message: &str, context: HashMap<String, String>, code: Option<String>, to_console: bool) {
        if level.severity() < self.min_level.severity() {
            return;
        }

        let record = StructuredLogRecord {
            ts: Utc::now(),
            level,
            code,
            message: message.to_string(),
            context,
        };

        let line = if self.json_output {
            match serde_json::to_string(&record) {
                Ok(json) => json,
                Err(_) => render_human_readable(&record),
            }
        } else {
            render_human_readable(&record)
        };

        if to_console {
            if level == LogLevel::Error {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }

        if let Some(path) = &self.log_file {
            // The diagnostic log must never take the run down.
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    pub fn info(&self, message: &str) {
        self.info_with_context(message, HashMap::new());
    }

    pub fn info_with_context(&self, message: &str, context: HashMap<String, String>) {
        self.log_structured(LogLevel::Info, message, context, None, !self.quiet);
    }

    pub fn verbose(&self, message: &str) {
        self.verbose_with_context(message, HashMap::new());
    }

    pub fn verbose_with_context(&self, message: &str, context: HashMap<String, String>) {
        self.log_structured(LogLevel::Debug, message, context, None, self.verbose && !self.quiet);
    }

    pub fn error_from_wlm_error(&self, error: &WlmError) {
        let mut context = HashMap::new();
        context.insert("error_kind".to_string(), format!("{:?}", error.kind));
        context.insert("detail".to_string(), error.message.clone());
        if let Some(source) = &error.source {
            context.insert("source".to_string(), source.to_string());
        }
        context.insert("hint".to_string(), error.code.hint().to_string());

        let enhanced_message = format!("{} Hint: {}", error.code.message(), error.code.hint());
        let level = if error.is_fatal() { LogLevel::Error } else { LogLevel::Warn };
        let to_console = level == LogLevel::Error || !self.quiet;
        self.log_structured(level, &enhanced_message, context, Some(error.code.to_string()), to_console);
    }

    pub fn error_with_hint(&self, code: ErrorCode, message: &str) {
        let mut context = HashMap::new();
        context.insert("hint".to_string(), code.hint().to_string());

        let enhanced_message = format!("{} Hint: {}", message, code.hint());
        self.log_structured(LogLevel::Error, &enhanced_message, context, Some(code.to_string()), true);
    }

    pub fn warn(&self, message: &str) {
        self.warn_with_context(message, HashMap::new());
    }

    pub fn warn_with_context(&self, message: &str, context: HashMap<String, String>) {
        self.log_structured(LogLevel::Warn, message, context, None, !self.quiet);
    }

    pub fn run_started(&self, benchmark: &str, competitors: usize) {
        let mut context = HashMap::new();
        context.insert("benchmark".to_string(), benchmark.to_string());
        context.insert("competitors".to_string(), competitors.to_string());
        self.verbose_with_context("Application started", context);
    }

    pub fn fetch_start(&self, url: &str) {
        let mut context = HashMap::new();
        context.insert("url".to_string(), url.to_string());
        self.verbose_with_context("Fetch started", context);
    }

    pub fn fetch_complete(&self, url: &str, seconds: f64) {
        let mut context = HashMap::new();
        context.insert("url".to_string(), url.to_string());
        context.insert("seconds".to_string(), format!("{:.3}", seconds));
        self.verbose_with_context("Fetch complete", context);
    }

    pub fn notification_sent(&self, channel: &str, recipient: &str) {
        let mut context = HashMap::new();
        context.insert("channel".to_string(), channel.to_string());
        context.insert("recipient".to_string(), recipient.to_string());
        self.info_with_context("Notification sent", context);
    }

    pub fn result_appended(&self, file: &str, text: &str) {
        let mut context = HashMap::new();
        context.insert("file".to_string(), file.to_string());
        context.insert("text".to_string(), text.to_string());
        // File only: the same text already went to stdout as part of the report.
        self.log_structured(LogLevel::Debug, "Append file", context, None, false);
    }
}

fn render_human_readable(record: &StructuredLogRecord) -> String {
    let timestamp = record.ts.format("%Y-%m-%dT%H:%M:%SZ");
    let level_str = record.level.as_str();

    let code_str = record.code.as_deref().unwrap_or("");
    let context_str = if record.context.is_empty() {
        String::new()
    } else {
        let mut pairs: Vec<_> = record.context.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        pairs.sort();
        format!(" | {}", pairs.join(", "))
    };

    if !code_str.is_empty() {
        format!("[{}][{}][{}] {}{}", code_str, level_str, timestamp, record.message, context_str)
    } else {
        format!("[{}][{}] {}{}", level_str, timestamp, record.message, context_str)
    }
}
