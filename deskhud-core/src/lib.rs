//! Board-agnostic core logic for the DeskHUD e-paper panel
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (panel, content source, clock)
//! - Screen region layout
//! - Versioned data store and fetch schedule
//! - Update units and their rendering
//! - Refresh coordinator (partial vs maintenance refreshes)
//! - Configuration type definitions and parser

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod layout;
pub mod schedule;
pub mod scheduler;
pub mod store;
pub mod time;
pub mod traits;
pub mod unit;

#[cfg(test)]
mod testing;

pub use deskhud_protocol::ContentGroup;
