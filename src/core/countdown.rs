//! Countdown to the next available fortune

use std::time::Duration;

/// Text shown once the countdown has run out
pub const COMPLETED_TEXT: &str = "And now again";

/// Time left until `deadline_ms`, or `None` if unset or already elapsed
pub fn remaining(deadline_ms: Option<i64>, now_ms: i64) -> Option<Duration> {
    let deadline = deadline_ms?;
    if deadline <= now_ms {
        return None;
    }
    Some(Duration::from_millis((deadline - now_ms) as u64))
}

/// Snapshot of the countdown at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// No deadline has been set
    Unset,
    /// Time left before the next fortune
    Running(Duration),
    /// Deadline passed
    Elapsed,
}

impl Countdown {
    pub fn at(deadline_ms: Option<i64>, now_ms: i64) -> Self {
        match deadline_ms {
            None => Countdown::Unset,
            Some(_) => remaining(deadline_ms, now_ms)
                .map(Countdown::Running)
                .unwrap_or(Countdown::Elapsed),
        }
    }

    pub fn is_elapsed(&self) -> bool {
        matches!(self, Countdown::Elapsed)
    }

    /// `HH:MM:SS` while running (hours are not wrapped into days)
    pub fn display(&self) -> String {
        match self {
            Countdown::Unset => String::new(),
            Countdown::Elapsed => COMPLETED_TEXT.to_string(),
            Countdown::Running(left) => {
                // Round up so the display never shows 00:00:00 while running
                let secs = left.as_millis().div_ceil(1000) as u64;
                format!(
                    "{:02}:{:02}:{:02}",
                    secs / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
        }
    }
}
