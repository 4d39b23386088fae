//! DeskHUD Content Protocol
//!
//! This crate defines what the panel receives from the content server:
//! the JSON feed response and the packed bitmap payloads it carries.
//!
//! # Feed Overview
//!
//! One GET returns a single object with optional, independently versioned
//! content groups:
//! ```text
//! ┌──────────┬──────────┬───────────────────────────────┐
//! │ GROUP    │ KEY      │ PAYLOAD                       │
//! ├──────────┼──────────┼───────────────────────────────┤
//! │ sentence │ sentence │ base64 1-bit bitmap or text   │
//! │ weather  │ wx       │ base64 1-bit bitmap or text   │
//! │ calendar │ cal      │ base64 1-bit bitmap or text   │
//! │ notes    │ note     │ base64 1-bit bitmap or text   │
//! │ forecast │ forecast │ base64 1-bit bitmap or text   │
//! └──────────┴──────────┴───────────────────────────────┘
//! ```
//!
//! Bitmaps are pre-rendered by the server at the exact size of their
//! on-screen region, so the panel only blits them.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod bitmap;
pub mod feed;
pub mod group;

pub use bitmap::{decode_base64, required_bytes, row_stride, Bitmap, BitmapError, MAX_BITMAP_BYTES};
pub use feed::{parse_feed, FeedResponse, FeedStr, GroupBlock, GroupUpdate, ParseError, Payload, PayloadFormat};
pub use group::{ContentGroup, GROUP_COUNT};
