//! Retained 1bpp framebuffer
//!
//! Each byte holds 8 pixels, MSB first. `BinaryColor::Off` (paper) is a set
//! bit and `BinaryColor::On` (ink) a cleared bit, which is the layout
//! SSD16xx-family controllers expect in their black/white RAM.
//!
//! The buffer is never cleared between refreshes. Drawing can be limited to
//! a clip window so a partial refresh cannot disturb pixels owned by other
//! regions.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

use deskhud_core::layout::{Rect, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Bytes per panel row
pub const BYTES_PER_ROW: usize = (SCREEN_WIDTH / 8) as usize;

/// Bytes per frame
pub const FRAME_BYTES: usize = BYTES_PER_ROW * SCREEN_HEIGHT as usize;

/// Whole-panel image that survives between refreshes
pub struct FrameBuffer {
    bytes: Vec<u8>,
    clip: Rect,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// All-paper frame with no clip
    pub fn new() -> Self {
        Self {
            bytes: vec![0xFF; FRAME_BYTES],
            clip: Rect::screen(),
        }
    }

    /// Raw frame, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Limit drawing to `window` (intersected with the screen)
    ///
    /// Returns the effective clip, or `None` if the window is off-screen;
    /// the clip is left unchanged in that case.
    pub fn set_clip(&mut self, window: Rect) -> Option<Rect> {
        let clip = intersect(&window, &Rect::screen())?;
        self.clip = clip;
        Some(clip)
    }

    pub fn reset_clip(&mut self) {
        self.clip = Rect::screen();
    }

    /// Colour at (x, y); `None` off-screen
    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        if !Rect::screen().contains(x, y) {
            return None;
        }
        let (index, mask) = locate(x, y);
        if self.bytes[index] & mask != 0 {
            Some(BinaryColor::Off)
        } else {
            Some(BinaryColor::On)
        }
    }

    /// Copy the bytes covering `window` into `out`, row by row
    ///
    /// The window is widened to whole bytes and clamped to the screen; the
    /// rectangle actually copied is returned.
    pub fn copy_window(&self, window: Rect, out: &mut Vec<u8>) -> Option<Rect> {
        let window = intersect(&window.align_horizontal(8), &Rect::screen())?;
        let first = (window.x / 8) as usize;
        let last = (window.right() / 8) as usize;

        out.clear();
        for y in window.y..window.bottom() {
            let row = y as usize * BYTES_PER_ROW;
            out.extend_from_slice(&self.bytes[row + first..row + last]);
        }
        Some(window)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if !self.clip.contains(x, y) {
                continue;
            }

            let (index, mask) = locate(x, y);
            match color {
                BinaryColor::Off => self.bytes[index] |= mask,
                BinaryColor::On => self.bytes[index] &= !mask,
            }
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

/// Byte index and bit mask of an on-screen pixel
fn locate(x: u32, y: u32) -> (usize, u8) {
    let index = y as usize * BYTES_PER_ROW + (x / 8) as usize;
    (index, 0x80 >> (x % 8))
}

fn intersect(a: &Rect, b: &Rect) -> Option<Rect> {
    let left = a.x.max(b.x);
    let top = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    if left >= right || top >= bottom {
        return None;
    }
    Some(Rect::new(left, top, right - left, bottom - top))
}
