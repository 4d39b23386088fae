//! Configuration types
//!
//! Board-agnostic configuration structures and the TOML subset they are
//! loaded from.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ConfigError};
pub use types::*;
