use crate::config::DEFAULT_SMS_FACTOR;
use crate::ranking::RankedSet;

/// Which notification channels a run should use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationDecision {
    pub email: bool,
    pub sms: bool,
    /// First competitor, in ranked order, that was fast enough to escalate to SMS.
    pub sms_trigger: Option<String>,
}

impl NotificationDecision {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn notifies(&self) -> bool {
        self.email || self.sms
    }
}

/// Turns a ranking into a notification decision. Pure: no I/O, no clock.
#[derive(Debug, Clone, Copy)]
pub struct NotificationPolicy {
    sms_factor: u32,
}

impl NotificationPolicy {
    /// `sms_factor` of 2 means "SMS when some competitor loaded at least twice as fast".
    pub fn new(sms_factor: u32) -> Self {
        Self { sms_factor: sms_factor.max(1) }
    }

    pub fn sms_factor(&self) -> u32 {
        self.sms_factor
    }

    pub fn decide(&self, ranked: &RankedSet) -> NotificationDecision {
        if ranked.benchmark_rank() == 1 {
            return NotificationDecision::none();
        }

        let slowest_allowed = ranked.benchmark().duration();
        let sms_trigger = ranked
            .competitors()
            .find(|competitor| {
                // competitor * factor <= benchmark, i.e. competitor <= benchmark / factor
                competitor
                    .duration()
                    .checked_mul(self.sms_factor)
                    .is_some_and(|scaled| scaled <= slowest_allowed)
            })
            .map(|competitor| competitor.url().to_string());

        NotificationDecision {
            email: true,
            sms: sms_trigger.is_some(),
            sms_trigger,
        }
    }
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SMS_FACTOR)
    }
}
