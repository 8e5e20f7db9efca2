use std::fmt;
use std::time::{Duration, Instant};

/// Decimal places kept in [`Measurement::rounded_secs`].
pub const ROUND_PLACES: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRole {
    Benchmark,
    Competitor,
}

/// One timed page load.
///
/// `duration` and `rounded_secs` are derived from `start`/`end` when the value is built
/// and there is no way to change them afterwards. The only field that changes after
/// construction is the rank, and only the ranker sets it.
#[derive(Debug, Clone)]
pub struct Measurement {
    url: String,
    role: SiteRole,
    start: Instant,
    end: Instant,
    duration: Duration,
    rounded_secs: f64,
    rank: Option<usize>,
}

impl Measurement {
    pub fn new(url: impl Into<String>, start: Instant, end: Instant) -> Self {
        Self::with_role(url, SiteRole::Competitor, start, end)
    }

    pub fn benchmark(url: impl Into<String>, start: Instant, end: Instant) -> Self {
        Self::with_role(url, SiteRole::Benchmark, start, end)
    }

    pub fn with_role(url: impl Into<String>, role: SiteRole, start: Instant, end: Instant) -> Self {
        debug_assert!(end >= start, "measurement ends before it starts");
        let duration = end.saturating_duration_since(start);
        Self {
            url: url.into(),
            role,
            start,
            end,
            duration,
            rounded_secs: round_secs(duration),
            rank: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn role(&self) -> SiteRole {
        self.role
    }

    pub fn is_benchmark(&self) -> bool {
        self.role == SiteRole::Benchmark
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn rounded_secs(&self) -> f64 {
        self.rounded_secs
    }

    /// 1-based position, `None` until ranked.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = Some(rank);
    }

    pub(crate) fn set_role(&mut self, role: SiteRole) {
        self.role = role;
    }
}

/// Rounds half up on the exact nanosecond count, so float scaling never shifts a tie.
fn round_secs(duration: Duration) -> f64 {
    let unit = 10u128.pow(9 - ROUND_PLACES as u32);
    let units = (duration.as_nanos() + unit / 2) / unit;
    units as f64 / 10f64.powi(ROUND_PLACES)
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            Some(rank) => write!(f, "{}.", rank)?,
            None => f.write_str("-.")?,
        }
        write!(
            f,
            " | time: {:.prec$} | url: {}",
            self.rounded_secs,
            self.url,
            prec = ROUND_PLACES as usize
        )
    }
}
