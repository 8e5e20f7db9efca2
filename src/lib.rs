pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod init;
pub mod mail;
pub mod measure;
pub mod measurement;
pub mod notify;
pub mod output;
pub mod policy;
pub mod ranking;
pub mod report;
pub mod sms;
pub mod validate;

// Re-export commonly used types for convenience
pub use cli::Args;
pub use error::{Result, WlmError, ErrorCode, ErrorKind};
pub use measurement::Measurement;
pub use policy::{NotificationDecision, NotificationPolicy};
pub use ranking::{rank, RankedSet};
