//! Wall-clock time and clock-aligned boundaries
//!
//! The panel only knows naive local civil time (after NTP sync). All
//! boundary arithmetic goes through seconds since 1970-01-01 so that
//! minute, hour, day, month and year carries are exact.

use core::fmt::Write;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seconds since 1970-01-01 00:00:00 local time
pub type EpochSeconds = i64;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Minutes in a day; the "once daily" cadence aligns to local midnight
pub const MINUTES_PER_DAY: u16 = 1440;

/// Local civil date and time
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
}

impl WallTime {
    /// Create a wall time from civil fields
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Seconds since the epoch
    pub fn to_epoch_seconds(&self) -> EpochSeconds {
        let days = days_from_civil(self.year as i64, self.month as i64, self.day as i64);
        days * SECONDS_PER_DAY
            + self.hour as i64 * SECONDS_PER_HOUR
            + self.minute as i64 * SECONDS_PER_MINUTE
            + self.second as i64
    }

    /// Civil time for a number of seconds since the epoch
    pub fn from_epoch_seconds(secs: EpochSeconds) -> Self {
        let days = secs.div_euclid(SECONDS_PER_DAY);
        let rem = secs.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        Self {
            year: year.clamp(0, u16::MAX as i64) as u16,
            month: month as u8,
            day: day as u8,
            hour: (rem / SECONDS_PER_HOUR) as u8,
            minute: ((rem % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
            second: (rem % SECONDS_PER_MINUTE) as u8,
        }
    }

    /// Same time shifted by a number of seconds
    pub fn add_seconds(&self, secs: i64) -> Self {
        Self::from_epoch_seconds(self.to_epoch_seconds() + secs)
    }

    /// "HH:MM:SS"
    pub fn format_hms(&self) -> String<8> {
        let mut s = String::new();
        let _ = write!(s, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        s
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Next clock-aligned boundary strictly after `now`
///
/// Alignment tiers:
/// - `0`: the next whole minute
/// - `1..60`: the next multiple of the interval within the hour; anything
///   at or past :60 carries to the top of the next hour
/// - `1440`: the next local midnight
/// - any other value: the current minute plus the interval, carried
///   through minutes, hours and days
pub fn next_boundary(now: &WallTime, interval_minutes: u16) -> WallTime {
    let minute_start = WallTime {
        second: 0,
        ..*now
    }
    .to_epoch_seconds();

    let next = match interval_minutes {
        0 => minute_start + SECONDS_PER_MINUTE,
        interval if interval < 60 => {
            let hour_start = minute_start - now.minute as i64 * SECONDS_PER_MINUTE;
            let next_minute = (now.minute as i64 / interval as i64 + 1) * interval as i64;
            if next_minute >= 60 {
                hour_start + SECONDS_PER_HOUR
            } else {
                hour_start + next_minute * SECONDS_PER_MINUTE
            }
        }
        MINUTES_PER_DAY => {
            let midnight = WallTime {
                hour: 0,
                minute: 0,
                second: 0,
                ..*now
            }
            .to_epoch_seconds();
            midnight + SECONDS_PER_DAY
        }
        interval => {
            let hours = (interval / 60) as i64;
            let minutes = (interval % 60) as i64;
            minute_start + hours * SECONDS_PER_HOUR + minutes * SECONDS_PER_MINUTE
        }
    };

    WallTime::from_epoch_seconds(next)
}

/// Next slot within the hour strictly after `now`
///
/// Slots sit at multiples of the interval past the hour. When the next
/// multiple would land at or past :60 the slot is the top of the next hour,
/// so any interval of an hour or more fires hourly on the hour. Zero is
/// treated as one minute.
pub fn next_hourly_slot(now: &WallTime, interval_minutes: u16) -> WallTime {
    let interval = interval_minutes.max(1) as i64;
    let hour_start = WallTime {
        minute: 0,
        second: 0,
        ..*now
    }
    .to_epoch_seconds();

    let next_minute = (now.minute as i64 / interval + 1) * interval;
    let next = if next_minute >= 60 {
        hour_start + SECONDS_PER_HOUR
    } else {
        hour_start + next_minute * SECONDS_PER_MINUTE
    };
    WallTime::from_epoch_seconds(next)
}
