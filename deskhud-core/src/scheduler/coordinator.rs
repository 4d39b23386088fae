//! Refresh coordinator
//!
//! Owns the data store, the update units and the panel, and runs one
//! tick at a time:
//!
//! ```text
//! tick: ResyncLocal → FetchIfDue{NotDue|Backoff|Fetch} → AggregateDirty
//!       → MaintenanceRefresh | PartialRefreshes(0..N)
//! ```
//!
//! Everything is sequential; the panel is only ever driven from here, so
//! two refreshes can never overlap.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;

use super::accounting::{MaintenanceReason, RefreshAccounting};
use crate::config::{PanelConfig, RefreshClass};
use crate::error::ErrorKind;
use crate::layout::{Region, REGION_COUNT};
use crate::store::{DataStore, MergeReport, RetryDecision};
use crate::time::WallTime;
use crate::traits::{Clock, ContentSource, FetchRequest, Panel};
use crate::unit::{RenderOutcome, UnitKind, UpdateUnit};

/// Fetch step result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchOutcome {
    /// Schedule not due (or still arming)
    NotDue,
    /// Waiting out the retry delay
    Backoff,
    /// Merged a response
    Fetched {
        /// Some content group got a new version
        changed: bool,
    },
    /// Attempt failed; the same cycle will be retried
    Retrying { attempt: u8, error: ErrorKind },
    /// Retries exhausted; cycle skipped and schedule advanced
    Skipped { error: ErrorKind },
}

/// Refresh step result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshKind {
    /// Nothing drawn
    Idle,
    /// Whole panel redrawn
    Maintenance(MaintenanceReason),
    /// Dirty units redrawn one window at a time
    Partial { count: u8 },
}

/// Summary of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Units whose source changed during resync
    pub synced: u8,
    pub fetch: FetchOutcome,
    /// Dirty units before refreshing
    pub dirty: u8,
    pub refresh: RefreshKind,
}

/// Drives the panel from the store
pub struct RefreshCoordinator<P, S, C> {
    config: PanelConfig,
    store: DataStore,
    units: [UpdateUnit; REGION_COUNT],
    accounting: RefreshAccounting,
    panel: P,
    source: S,
    clock: C,
}

impl<P, S, C> RefreshCoordinator<P, S, C>
where
    P: Panel,
    S: ContentSource,
    C: Clock,
{
    pub fn new(config: PanelConfig, panel: P, source: S, clock: C) -> Self {
        let units = Region::ALL.map(|region| UpdateUnit::new(region, config.unit(region)));

        Self {
            store: DataStore::new(&config.fetch),
            accounting: RefreshAccounting::new(&config.refresh),
            config,
            units,
            panel,
            source,
            clock,
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn units(&self) -> &[UpdateUnit] {
        &self.units
    }

    pub fn unit(&self, region: Region) -> &UpdateUnit {
        &self.units[region.index()]
    }

    pub fn accounting(&self) -> &RefreshAccounting {
        &self.accounting
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn set_wifi_connected(&mut self, connected: bool) {
        self.store.status_mut().set_wifi_connected(connected);
    }

    pub fn set_status_message(&mut self, message: &str) {
        self.store.status_mut().set_message(message);
    }

    /// Fetch once at boot, ignoring the schedule
    ///
    /// Every unit is synced afterwards so the first full refresh shows the
    /// fetched content. Returns whether the fetch succeeded.
    pub fn initial_fetch(&mut self) -> bool {
        let now = self.clock.local_time();
        info!("initial fetch");

        let ok = match self.fetch_once(now) {
            Ok(_) => {
                self.store.mark_fetched(now);
                true
            }
            Err(_) => false,
        };

        if let Some(now) = now {
            self.store.status_mut().set_local_time(&now);
        }
        for unit in self.units.iter_mut() {
            unit.sync_from_store(&self.store);
        }
        ok
    }

    /// Redraw every unit with one full refresh
    pub fn force_full_refresh(&mut self) -> RefreshKind {
        let now = self.clock.local_time();
        let uptime = self.clock.uptime_ms();
        self.maintenance_refresh(now, uptime, MaintenanceReason::Forced)
    }

    /// Run one scheduling cycle
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.local_time();
        let uptime = self.clock.uptime_ms();

        let synced = self.resync_local(now);
        let fetch = self.fetch_if_due(now, uptime);
        let dirty = self.units.iter().filter(|u| u.is_dirty()).count() as u8;

        let refresh = match self.accounting.maintenance_due(uptime) {
            Some(reason) => self.maintenance_refresh(now, uptime, reason),
            None => self.partial_refreshes(now),
        };

        TickReport {
            synced,
            fetch,
            dirty,
            refresh,
        }
    }

    /// Pull new versions into every unit whose cadence is due
    fn resync_local(&mut self, now: Option<WallTime>) -> u8 {
        let mut synced = 0;
        for unit in self.units.iter_mut() {
            if !unit.should_update(now) {
                continue;
            }
            if unit.kind() == UnitKind::Clock {
                if let Some(now) = now {
                    self.store.status_mut().set_local_time(&now);
                }
            }
            if unit.sync_from_store(&self.store) {
                synced += 1;
            }
        }
        synced
    }

    fn fetch_if_due(&mut self, now: Option<WallTime>, uptime: u64) -> FetchOutcome {
        if !self.store.should_fetch(now) {
            return FetchOutcome::NotDue;
        }

        if self.store.fetch_schedule().in_backoff(uptime) {
            trace!("fetch: backing off");
            return FetchOutcome::Backoff;
        }

        self.store.fetch_schedule_mut().record_attempt(uptime);
        debug!("fetch: attempt");

        match self.fetch_once(now) {
            Ok(report) => {
                self.store.fetch_schedule_mut().record_success();
                self.store.mark_fetched(now);
                info!("fetch: ok, changed={}", report.any());
                FetchOutcome::Fetched {
                    changed: report.any(),
                }
            }
            Err(error) => match self.store.fetch_schedule_mut().record_failure() {
                RetryDecision::Retry { attempt } => {
                    warn!("fetch: failed ({}), attempt {}", error, attempt);
                    FetchOutcome::Retrying { attempt, error }
                }
                RetryDecision::GiveUp => {
                    warn!("fetch: giving up until next cycle ({})", error);
                    self.store.mark_fetched(now);
                    FetchOutcome::Skipped { error }
                }
            },
        }
    }

    /// One request and merge; the store records errors and sync time
    fn fetch_once(&mut self, now: Option<WallTime>) -> Result<MergeReport, ErrorKind> {
        let server = &self.config.server;
        let request = FetchRequest {
            url: server.url.as_str(),
            bearer_token: server.bearer_token.as_deref(),
            api_key: server.api_key.as_deref(),
            timeout_ms: server.timeout_ms,
        };

        let body = match self.source.fetch(&request) {
            Ok(body) => body,
            Err(err) => {
                self.store.status_mut().set_error(err);
                return Err(err.kind());
            }
        };

        let report = self.store.merge(body).map_err(|err| err.kind())?;
        if let Some(now) = now {
            self.store.status_mut().record_sync(&now);
        }
        Ok(report)
    }

    fn maintenance_refresh(
        &mut self,
        now: Option<WallTime>,
        uptime: u64,
        reason: MaintenanceReason,
    ) -> RefreshKind {
        info!("maintenance refresh: {}", reason);

        let store = &self.store;
        let units = &self.units;
        let result = self.panel.full_refresh(|canvas| {
            for unit in units.iter() {
                draw_unit(unit, store, canvas);
            }
        });

        // A failed panel is not retried until the next window
        self.accounting.record_maintenance(uptime);

        match result {
            Ok(()) => {
                for unit in self.units.iter_mut().filter(|u| u.is_dirty()) {
                    unit.mark_updated(now);
                }
            }
            Err(_) => error!("full refresh failed"),
        }
        RefreshKind::Maintenance(reason)
    }

    fn partial_refreshes(&mut self, now: Option<WallTime>) -> RefreshKind {
        let store = &self.store;
        let mut count = 0u8;

        for unit in self.units.iter_mut() {
            if !unit.is_dirty() || unit.refresh_class() != RefreshClass::FastPartial {
                continue;
            }

            let window = unit.rect();
            let target: &UpdateUnit = unit;
            let result = self
                .panel
                .partial_refresh(window, |canvas| draw_unit(target, store, canvas));

            match result {
                Ok(()) => {
                    debug!("partial refresh: {}", unit.region().name());
                    unit.mark_updated(now);
                    self.accounting.record_partial();
                    count += 1;
                }
                // Left dirty; retried next tick
                Err(_) => warn!("partial refresh of {} failed", unit.region().name()),
            }
        }

        if count == 0 {
            RefreshKind::Idle
        } else {
            RefreshKind::Partial { count }
        }
    }
}

fn draw_unit<D>(unit: &UpdateUnit, store: &DataStore, canvas: &mut D)
where
    D: DrawTarget<Color = BinaryColor>,
{
    match unit.render(store, canvas) {
        Ok(RenderOutcome::Drawn) => {}
        Ok(RenderOutcome::Skipped(kind)) => {
            debug!("unit {} kept old pixels: {}", unit.region().name(), kind)
        }
        Err(_) => warn!("unit {}: draw failed", unit.region().name()),
    }
}
