//! Time source trait

use crate::time::WallTime;

/// Wall clock and monotonic uptime
pub trait Clock {
    /// Local civil time
    ///
    /// Returns `None` until the time has been synchronized (e.g. by NTP).
    fn local_time(&self) -> Option<WallTime>;

    /// Milliseconds since boot, monotonic
    ///
    /// Used for retry backoff and the maintenance refresh window, which must
    /// keep working while the wall clock is unset or jumps.
    fn uptime_ms(&self) -> u64;
}
