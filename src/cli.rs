use clap::{Parser, ArgAction, ValueEnum};

/// Log output format options
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Log level options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Debug level (most verbose)
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

/// App to measure and compare time of loading web pages.
#[derive(Parser, Debug, Clone)]
#[command(name = "wlm", version, about = "App to measure and compare time of loading web pages.")]
pub struct Args {
    /// URL of main website
    #[arg(short, long, required_unless_present = "init")]
    pub url: Option<String>,

    /// URLs of websites to compare
    #[arg(short, long, num_args = 1.., required_unless_present = "init")]
    pub list: Vec<String>,

    /// Mail address for notification
    #[arg(short, long)]
    pub mail: Option<String>,

    /// Phone number for notification
    #[arg(short, long = "phone_number")]
    pub phone_number: Option<String>,

    /// Alternate configuration file (default: ~/.wlmrc)
    #[arg(long)]
    pub config: Option<String>,

    /// Directory for the result file and the daily log
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Per-page fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print SMS notifications instead of sending them
    #[arg(long, action = ArgAction::SetTrue)]
    pub dummy_sms: bool,

    /// Verbose output
    #[arg(long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Log output format (json or text)
    #[arg(long, value_enum, help = "Log output format")]
    pub log_format: Option<LogFormat>,

    /// Log level (debug, info, warn, error)
    #[arg(long, value_enum, help = "Log level")]
    pub log_level: Option<LogLevel>,

    /// Quiet mode
    #[arg(long, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// Create a default ~/.wlmrc config template
    #[arg(long)]
    pub init: bool,
}
