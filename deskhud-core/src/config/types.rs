//! Configuration type definitions
//!
//! These types represent the panel configuration. Every field has a
//! default, so a configuration file only needs to list what it changes.

use heapless::String;

use crate::layout::{Region, REGION_COUNT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum content server URL length
pub const MAX_URL_LEN: usize = 128;

/// Maximum bearer token / API key length
pub const MAX_SECRET_LEN: usize = 64;

/// Default fetch cadence (minutes)
pub const DEFAULT_FETCH_INTERVAL_MIN: u16 = 5;
/// Consecutive failed fetches before skipping a cycle
pub const DEFAULT_MAX_FETCH_RETRIES: u8 = 3;
/// Delay between fetch retries (ms)
pub const DEFAULT_RETRY_DELAY_MS: u32 = 10_000;
/// Request timeout handed to the content source (ms)
pub const DEFAULT_FETCH_TIMEOUT_MS: u32 = 30_000;
/// Maximum time between full refreshes (ms)
pub const DEFAULT_MAINTENANCE_INTERVAL_MS: u32 = 3_600_000;
/// Partial refreshes allowed between full refreshes
pub const DEFAULT_MAX_PARTIAL_REFRESHES: u32 = 1000;

/// How a unit's region is redrawn when it goes stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RefreshClass {
    /// Redrawn on its own with a windowed partial refresh
    #[default]
    FastPartial,
    /// Only redrawn during full maintenance refreshes
    FullOnly,
}

/// Content server access
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServerConfig {
    /// Feed URL
    pub url: String<MAX_URL_LEN>,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<String<MAX_SECRET_LEN>>,
    /// Sent as `X-API-Key`
    pub api_key: Option<String<MAX_SECRET_LEN>>,
    /// Request timeout (ms)
    pub timeout_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            bearer_token: None,
            api_key: None,
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

/// Fetch cadence and retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FetchConfig {
    /// Fetch every N minutes, aligned to the hour; the server may override
    pub interval_minutes: u16,
    /// Failed attempts per cycle before the cycle is skipped
    pub max_retries: u8,
    /// Minimum delay between attempts within one cycle (ms)
    pub retry_delay_ms: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_FETCH_INTERVAL_MIN,
            max_retries: DEFAULT_MAX_FETCH_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

/// Ghosting control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefreshConfig {
    /// Force a full refresh after this long (ms)
    pub maintenance_interval_ms: u32,
    /// Force a full refresh after this many partial refreshes
    pub max_partial_refreshes: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            maintenance_interval_ms: DEFAULT_MAINTENANCE_INTERVAL_MS,
            max_partial_refreshes: DEFAULT_MAX_PARTIAL_REFRESHES,
        }
    }
}

/// Per-region update cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitConfig {
    /// Check for changes every N minutes (0 = every minute)
    pub interval_minutes: u16,
    /// Refresh class
    pub refresh: RefreshClass,
}

impl UnitConfig {
    /// Factory cadence for a region
    pub const fn default_for(region: Region) -> Self {
        let interval_minutes = match region {
            Region::Time | Region::Status => 0,
            Region::Notes => 5,
            Region::Sentence | Region::Weather | Region::Free => 30,
            Region::Calendar => 1440,
        };
        Self {
            interval_minutes,
            refresh: RefreshClass::FastPartial,
        }
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub refresh: RefreshConfig,
    /// Indexed by [`Region::index`]
    pub units: [UnitConfig; REGION_COUNT],
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            fetch: FetchConfig::default(),
            refresh: RefreshConfig::default(),
            units: Region::ALL.map(UnitConfig::default_for),
        }
    }
}

impl PanelConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Cadence for one region
    pub fn unit(&self, region: Region) -> &UnitConfig {
        &self.units[region.index()]
    }

    /// Mutable cadence for one region
    pub fn unit_mut(&mut self, region: Region) -> &mut UnitConfig {
        &mut self.units[region.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.fetch.interval_minutes, 5);
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.retry_delay_ms, 10_000);
        assert_eq!(config.refresh.maintenance_interval_ms, 3_600_000);
        assert_eq!(config.refresh.max_partial_refreshes, 1000);
        assert_eq!(config.server.timeout_ms, 30_000);
        assert!(config.server.url.is_empty());
    }

    #[test]
    fn test_unit_cadences() {
        let config = PanelConfig::default();
        assert_eq!(config.unit(Region::Time).interval_minutes, 0);
        assert_eq!(config.unit(Region::Status).interval_minutes, 0);
        assert_eq!(config.unit(Region::Notes).interval_minutes, 5);
        assert_eq!(config.unit(Region::Weather).interval_minutes, 30);
        assert_eq!(config.unit(Region::Calendar).interval_minutes, 1440);
        for region in Region::ALL {
            assert_eq!(config.unit(region).refresh, RefreshClass::FastPartial);
        }
    }
}
