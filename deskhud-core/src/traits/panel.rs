//! E-paper panel trait

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;

use crate::layout::Rect;

/// Trait for the e-paper panel
///
/// Both refreshes are synchronous: when they return, the new image is on
/// the glass. The draw callback may run more than once (paged drivers call
/// it once per page), so it must draw the same pixels every time.
pub trait Panel {
    /// Drawing surface handed to the callbacks
    type Canvas: DrawTarget<Color = BinaryColor>;

    /// Driver error
    type Error: core::fmt::Debug;

    /// Redraw the whole panel with a full (flashing) refresh
    fn full_refresh<F>(&mut self, draw: F) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Canvas);

    /// Redraw one window with a fast partial refresh
    ///
    /// Drawing outside `window` is clipped.
    fn partial_refresh<F>(&mut self, window: Rect, draw: F) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Canvas);
}
