//! Fetch schedule and retry bookkeeping
//!
//! Fetches land on multiples of the interval past the hour, and never later
//! than the top of the next hour, whatever `ttl` the server asks for.

use crate::config::FetchConfig;
use crate::schedule::AlignedSchedule;
use crate::time::WallTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetryDecision {
    /// Try the same cycle again once the backoff delay has passed
    Retry {
        /// Failed attempts so far in this cycle
        attempt: u8,
    },
    /// Retries exhausted; skip to the next cycle
    GiveUp,
}

/// When to fetch next and how the current cycle is going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FetchSchedule {
    schedule: AlignedSchedule,
    retry_count: u8,
    max_retries: u8,
    retry_delay_ms: u32,
    last_attempt_ms: Option<u64>,
}

impl FetchSchedule {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            schedule: AlignedSchedule::hourly(config.interval_minutes.max(1)),
            retry_count: 0,
            max_retries: config.max_retries.max(1),
            retry_delay_ms: config.retry_delay_ms,
            last_attempt_ms: None,
        }
    }

    /// Whether a fetch is due
    ///
    /// The first call with a wall clock only computes the first boundary.
    pub fn should_fetch(&mut self, now: Option<WallTime>) -> bool {
        self.schedule.poll(now)
    }

    /// Move the next fetch to the slot after `now`
    pub fn mark_fetched(&mut self, now: Option<WallTime>) {
        self.schedule.advance(now);
    }

    /// Fetch interval in minutes
    pub fn interval_minutes(&self) -> u16 {
        self.schedule.interval_minutes()
    }

    /// Change the fetch interval; zero is ignored
    ///
    /// Returns whether the interval changed.
    pub fn set_interval(&mut self, minutes: u16) -> bool {
        if minutes == 0 || minutes == self.schedule.interval_minutes() {
            return false;
        }
        self.schedule.set_interval(minutes);
        true
    }

    pub fn next_fetch(&self) -> Option<WallTime> {
        self.schedule.next_due()
    }

    /// Failed attempts in the current cycle
    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    /// Whether a retry must wait because the last attempt was too recent
    pub fn in_backoff(&self, uptime_ms: u64) -> bool {
        if self.retry_count == 0 {
            return false;
        }
        match self.last_attempt_ms {
            Some(last) => uptime_ms.saturating_sub(last) < self.retry_delay_ms as u64,
            None => false,
        }
    }

    /// Note the start of an attempt
    pub fn record_attempt(&mut self, uptime_ms: u64) {
        self.last_attempt_ms = Some(uptime_ms);
    }

    pub fn record_success(&mut self) {
        self.retry_count = 0;
    }

    /// Count a failed attempt
    ///
    /// The counter resets once it reaches the maximum, and the caller is
    /// told to skip the cycle.
    pub fn record_failure(&mut self) -> RetryDecision {
        self.retry_count = self.retry_count.saturating_add(1);
        if self.retry_count >= self.max_retries {
            self.retry_count = 0;
            RetryDecision::GiveUp
        } else {
            RetryDecision::Retry {
                attempt: self.retry_count,
            }
        }
    }
}
