//! Full refresh bookkeeping
//!
//! Partial refreshes leave ghosting behind. A full (maintenance) refresh
//! is forced once per time window and once per batch of partial
//! refreshes, whichever comes first.

use crate::config::RefreshConfig;

/// Why a full refresh was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MaintenanceReason {
    /// Maintenance window elapsed
    Window,
    /// Partial refresh ceiling reached
    PartialCeiling,
    /// Requested explicitly (boot, debugging)
    Forced,
}

/// Partial refresh counter and last full refresh time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshAccounting {
    partial_count: u32,
    last_maintenance_ms: u64,
    interval_ms: u64,
    max_partials: u32,
}

impl RefreshAccounting {
    pub fn new(config: &RefreshConfig) -> Self {
        Self {
            partial_count: 0,
            last_maintenance_ms: 0,
            interval_ms: config.maintenance_interval_ms as u64,
            max_partials: config.max_partial_refreshes,
        }
    }

    /// Partial refreshes since the last full refresh
    pub fn partial_count(&self) -> u32 {
        self.partial_count
    }

    /// Uptime of the last full refresh (ms)
    pub fn last_maintenance_ms(&self) -> u64 {
        self.last_maintenance_ms
    }

    /// Whether a full refresh is owed at `uptime_ms`
    pub fn maintenance_due(&self, uptime_ms: u64) -> Option<MaintenanceReason> {
        if uptime_ms.saturating_sub(self.last_maintenance_ms) >= self.interval_ms {
            Some(MaintenanceReason::Window)
        } else if self.partial_count >= self.max_partials {
            Some(MaintenanceReason::PartialCeiling)
        } else {
            None
        }
    }

    pub fn record_partial(&mut self) {
        self.partial_count = self.partial_count.saturating_add(1);
    }

    pub fn record_maintenance(&mut self, uptime_ms: u64) {
        self.partial_count = 0;
        self.last_maintenance_ms = uptime_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounting(interval_ms: u32, max_partials: u32) -> RefreshAccounting {
        RefreshAccounting::new(&RefreshConfig {
            maintenance_interval_ms: interval_ms,
            max_partial_refreshes: max_partials,
        })
    }

    #[test]
    fn test_window() {
        let mut acc = accounting(1000, 100);
        assert_eq!(acc.maintenance_due(999), None);
        assert_eq!(acc.maintenance_due(1000), Some(MaintenanceReason::Window));

        acc.record_maintenance(1000);
        assert_eq!(acc.maintenance_due(1999), None);
        assert_eq!(acc.maintenance_due(2000), Some(MaintenanceReason::Window));
    }

    #[test]
    fn test_partial_ceiling() {
        let mut acc = accounting(60_000, 3);
        for _ in 0..2 {
            acc.record_partial();
        }
        assert_eq!(acc.maintenance_due(10), None);

        acc.record_partial();
        assert_eq!(acc.maintenance_due(10), Some(MaintenanceReason::PartialCeiling));

        acc.record_maintenance(10);
        assert_eq!(acc.partial_count(), 0);
        assert_eq!(acc.maintenance_due(20), None);
    }
}
