//! Lazily initialized, clock-aligned schedule
//!
//! Shared by the fetch schedule and every update unit. The first evaluation
//! with a valid wall clock only arms the schedule at the next boundary; it
//! never reports due on that same call. Advancing always recomputes from the
//! current time, so a long stall yields one trigger rather than a backlog.

use crate::time::{next_boundary, next_hourly_slot, EpochSeconds, WallTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How boundaries are placed on the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alignment {
    /// Tiered alignment of [`next_boundary`]
    Tiered,
    /// Slots within the hour of [`next_hourly_slot`]
    Hourly,
}

/// Clock-aligned trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlignedSchedule {
    interval_minutes: u16,
    alignment: Alignment,
    next: Option<EpochSeconds>,
}

impl AlignedSchedule {
    /// Create an uninitialized schedule with tiered alignment
    pub const fn new(interval_minutes: u16) -> Self {
        Self {
            interval_minutes,
            alignment: Alignment::Tiered,
            next: None,
        }
    }

    /// Create an uninitialized schedule that never aligns past the hour
    pub const fn hourly(interval_minutes: u16) -> Self {
        Self {
            interval_minutes,
            alignment: Alignment::Hourly,
            next: None,
        }
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn interval_minutes(&self) -> u16 {
        self.interval_minutes
    }

    /// Change the interval; takes effect at the next advance
    pub fn set_interval(&mut self, minutes: u16) {
        self.interval_minutes = minutes;
    }

    /// Whether a boundary has been computed yet
    pub fn is_initialized(&self) -> bool {
        self.next.is_some()
    }

    /// Next trigger time, once initialized
    pub fn next_due(&self) -> Option<WallTime> {
        self.next.map(WallTime::from_epoch_seconds)
    }

    /// Check whether the schedule has come due
    ///
    /// Without a wall clock nothing is due. The first call with a wall clock
    /// initializes the boundary and returns false.
    pub fn poll(&mut self, now: Option<WallTime>) -> bool {
        let Some(now) = now else {
            return false;
        };

        match self.next {
            None => {
                self.advance_from(&now);
                false
            }
            Some(next) => now.to_epoch_seconds() >= next,
        }
    }

    /// Move the boundary past `now`; no-op without a wall clock
    pub fn advance(&mut self, now: Option<WallTime>) {
        if let Some(now) = now {
            self.advance_from(&now);
        }
    }

    fn advance_from(&mut self, now: &WallTime) {
        let next = match self.alignment {
            Alignment::Tiered => next_boundary(now, self.interval_minutes),
            Alignment::Hourly => next_hourly_slot(now, self.interval_minutes),
        };
        self.next = Some(next.to_epoch_seconds());
    }
}
