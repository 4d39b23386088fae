//! Panel-side building blocks for DeskHUD
//!
//! This crate provides:
//! - [`FrameBuffer`], a retained 800x480 1bpp image that units draw into
//! - [`PanelBus`], the byte-level interface to an e-paper controller
//! - [`BufferedPanel`], which implements the core `Panel` trait on top of
//!   the two
//!
//! # Architecture
//!
//! The refresh coordinator never talks to the controller directly. It
//! hands a draw callback to the panel; the panel runs it against the
//! retained framebuffer and then ships either the whole frame (full
//! refresh) or just the bytes under the refresh window (partial refresh)
//! to the bus. Anything outside the window keeps its previous pixels.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod framebuffer;
pub mod panel;

pub use framebuffer::{FrameBuffer, BYTES_PER_ROW, FRAME_BYTES};
pub use panel::{BufferedPanel, PanelBus, PanelError};
