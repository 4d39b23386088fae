//! Collaborator traits
//!
//! These traits define the interface between the refresh logic and the
//! board: wall clock, network transport and the e-paper panel.

pub mod clock;
pub mod panel;
pub mod source;

pub use clock::Clock;
pub use panel::Panel;
pub use source::{ContentSource, FetchRequest};
