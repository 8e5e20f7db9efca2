use crate::error::{ErrorCode, Result, WlmError};

pub const MAIL_SUBJECT: &str = "notification from Website Load Measure app";

/// One-line placement summary, also used as the `comparison_result` of a report.
pub fn result_line(place: usize, total: usize) -> String {
    format!("Your page is {} of {} tested pages", place, total)
}

pub fn mail_body(place: usize, total: usize) -> String {
    format!(
        "{}.\n\nThe benchmarked website is loaded slower than at least one of the competitors.\n",
        result_line(place, total)
    )
}

pub fn sms_body(place: usize, total: usize, recipient: &str) -> String {
    format!(
        "To: {}\n\n{}.\nThe benchmarked website is loaded twice as slow as at least one of the competitors.\n",
        recipient,
        result_line(place, total)
    )
}

/// A channel that tells the operator how the benchmark placed.
pub trait Notifier {
    /// Short channel name for logs, e.g. `mail` or `sms`.
    fn channel(&self) -> &'static str;

    /// Sends the placement to `recipient`, or to the configured default when `None`.
    /// Returns the recipient actually used.
    fn send(&self, place: usize, total: usize, recipient: Option<&str>) -> Result<String>;
}

/// Picks the explicit recipient, falling back to the configured default. Blank values count as unset.
pub fn resolve_recipient(explicit: Option<&str>, default: Option<&str>, channel: &str) -> Result<String> {
    explicit
        .filter(|r| !r.trim().is_empty())
        .or_else(|| default.filter(|r| !r.trim().is_empty()))
        .map(str::to_string)
        .ok_or_else(|| {
            WlmError::transport(ErrorCode::E703, format!("no {} recipient given and no default configured", channel))
        })
}
