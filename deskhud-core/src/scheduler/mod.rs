//! Refresh scheduling
//!
//! The coordinator decides, each tick, which regions are stale and whether
//! to redraw them with partial refreshes or fold everything into a full
//! maintenance refresh.

mod accounting;
mod coordinator;

pub use accounting::{MaintenanceReason, RefreshAccounting};
pub use coordinator::{FetchOutcome, RefreshCoordinator, RefreshKind, TickReport};
