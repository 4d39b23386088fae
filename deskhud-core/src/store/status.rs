//! Local status fields shown in the status region

use core::fmt::{self, Write};

use heapless::String;

use crate::time::WallTime;

/// Maximum length of the status and error strings
pub const MAX_STATUS_LEN: usize = 48;

/// Locally produced status
///
/// Every change bumps `revision`, which the status unit treats like a
/// content version. The local time string is excluded: the clock unit
/// watches it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusBoard {
    local_time: String<8>,
    wifi_connected: bool,
    last_sync: String<8>,
    error: String<MAX_STATUS_LEN>,
    message: String<MAX_STATUS_LEN>,
    revision: u32,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change counter for everything but the local time
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// "HH:MM:SS", empty before the clock is set
    pub fn local_time(&self) -> &str {
        &self.local_time
    }

    /// "HH:MM" prefix of the local time
    pub fn local_minute(&self) -> &str {
        self.local_time.get(..5).unwrap_or("")
    }

    pub fn set_local_time(&mut self, now: &WallTime) {
        self.local_time = now.format_hms();
    }

    pub fn wifi_connected(&self) -> bool {
        self.wifi_connected
    }

    pub fn set_wifi_connected(&mut self, connected: bool) {
        if self.wifi_connected != connected {
            self.wifi_connected = connected;
            self.bump();
        }
    }

    /// "HH:MM:SS" of the last successful fetch, empty if none yet
    pub fn last_sync(&self) -> &str {
        &self.last_sync
    }

    pub fn record_sync(&mut self, now: &WallTime) {
        let stamp = now.format_hms();
        if self.last_sync != stamp {
            self.last_sync = stamp;
            self.bump();
        }
    }

    /// Last error message, empty if none
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Replace the error message; long messages are truncated
    pub fn set_error(&mut self, error: impl fmt::Display) {
        let text: String<MAX_STATUS_LEN> = truncated(format_args!("{}", error));
        if self.error != text {
            self.error = text;
            self.bump();
        }
    }

    pub fn clear_error(&mut self) {
        if !self.error.is_empty() {
            self.error.clear();
            self.bump();
        }
    }

    /// Free-form status line (boot progress, portal hints)
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: &str) {
        let text: String<MAX_STATUS_LEN> = truncated(format_args!("{}", message));
        if self.message != text {
            self.message = text;
            self.bump();
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Writer that silently drops what doesn't fit
struct Truncating<const N: usize>(String<N>);

impl<const N: usize> Write for Truncating<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

fn truncated<const N: usize>(args: fmt::Arguments<'_>) -> String<N> {
    let mut out = Truncating(String::new());
    let _ = out.write_fmt(args);
    out.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_bump_revision() {
        let mut status = StatusBoard::new();
        assert_eq!(status.revision(), 0);

        status.set_wifi_connected(true);
        assert_eq!(status.revision(), 1);

        // Same value is not a change
        status.set_wifi_connected(true);
        assert_eq!(status.revision(), 1);

        status.set_error("HTTP error: 500");
        status.set_error("HTTP error: 500");
        assert_eq!(status.revision(), 2);

        status.clear_error();
        status.clear_error();
        assert_eq!(status.revision(), 3);
        assert_eq!(status.error(), "");
    }

    #[test]
    fn test_local_time_is_not_a_status_change() {
        let mut status = StatusBoard::new();
        assert_eq!(status.local_minute(), "");

        status.set_local_time(&WallTime::new(2025, 6, 1, 7, 30, 15));
        assert_eq!(status.local_time(), "07:30:15");
        assert_eq!(status.local_minute(), "07:30");
        assert_eq!(status.revision(), 0);
    }

    #[test]
    fn test_record_sync() {
        let mut status = StatusBoard::new();
        status.record_sync(&WallTime::new(2025, 6, 1, 12, 0, 3));
        assert_eq!(status.last_sync(), "12:00:03");
        assert_eq!(status.revision(), 1);
    }

    #[test]
    fn test_long_messages_truncate() {
        let mut status = StatusBoard::new();
        let long = "connect to DeskHUD-Setup and open 192.168.4.1 to configure WiFi";
        status.set_message(long);
        assert_eq!(status.message().len(), MAX_STATUS_LEN);
        assert!(long.starts_with(status.message()));
    }
}
