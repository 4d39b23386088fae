//! Framebuffer-backed panel
//!
//! [`BufferedPanel`] adapts any [`PanelBus`] (an SPI e-paper controller, an
//! emulator, a test recorder) to the `Panel` trait the refresh coordinator
//! drives.

use alloc::vec::Vec;
use core::fmt::Debug;

use deskhud_core::layout::Rect;
use deskhud_core::traits::Panel;

use crate::framebuffer::FrameBuffer;

/// Byte-level link to an e-paper controller
///
/// Both calls block until the refresh has finished on the glass.
pub trait PanelBus {
    /// Bus or controller error
    type Error: Debug;

    /// Write a whole frame and run a full (flashing) refresh
    fn push_full(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Write the rows of `window` and run a fast partial refresh
    ///
    /// `window` is byte aligned horizontally and `bytes` holds
    /// `window.width / 8` bytes for each of its rows.
    fn push_partial(&mut self, window: Rect, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Panel failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError<E> {
    /// Refresh window does not overlap the screen
    Window(Rect),
    /// The bus rejected the transfer
    Bus(E),
}

/// Panel keeping a retained frame in front of a [`PanelBus`]
pub struct BufferedPanel<B> {
    bus: B,
    frame: FrameBuffer,
    scratch: Vec<u8>,
}

impl<B: PanelBus> BufferedPanel<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            frame: FrameBuffer::new(),
            scratch: Vec::new(),
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: PanelBus> Panel for BufferedPanel<B> {
    type Canvas = FrameBuffer;
    type Error = PanelError<B::Error>;

    /// Draw over the retained frame and push all of it
    fn full_refresh<F>(&mut self, mut draw: F) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Canvas),
    {
        self.frame.reset_clip();
        draw(&mut self.frame);
        self.bus
            .push_full(self.frame.as_bytes())
            .map_err(PanelError::Bus)
    }

    /// Draw with the frame clipped to `window` and push only its bytes
    fn partial_refresh<F>(&mut self, window: Rect, mut draw: F) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Canvas),
    {
        if self.frame.set_clip(window).is_none() {
            return Err(PanelError::Window(window));
        }
        draw(&mut self.frame);
        self.frame.reset_clip();

        let pushed = self
            .frame
            .copy_window(window, &mut self.scratch)
            .ok_or(PanelError::Window(window))?;
        self.bus
            .push_partial(pushed, &self.scratch)
            .map_err(PanelError::Bus)
    }
}
