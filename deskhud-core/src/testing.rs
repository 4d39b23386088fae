//! Test doubles for the collaborator traits

use std::collections::VecDeque;
use std::string::String;
use std::vec;
use std::vec::Vec;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

use crate::error::FetchError;
use crate::layout::{Rect, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::time::WallTime;
use crate::traits::{Clock, ContentSource, FetchRequest, Panel};

/// Full-screen canvas remembering the last colour drawn at each pixel
pub struct Canvas {
    pub pixels: Vec<Option<BinaryColor>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            pixels: vec![None; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
        }
    }

    pub fn at(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.pixels[(y * SCREEN_WIDTH + x) as usize]
    }

    /// Number of pixels drawn at least once
    pub fn touched(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < SCREEN_WIDTH && (p.y as u32) < SCREEN_HEIGHT {
                self.pixels[(p.y as u32 * SCREEN_WIDTH + p.x as u32) as usize] = Some(color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

/// Clock set by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    pub now: Option<WallTime>,
    pub uptime_ms: u64,
}

impl ManualClock {
    pub fn at(now: WallTime, uptime_ms: u64) -> Self {
        Self {
            now: Some(now),
            uptime_ms,
        }
    }

    pub fn set(&mut self, now: WallTime, uptime_ms: u64) {
        self.now = Some(now);
        self.uptime_ms = uptime_ms;
    }
}

impl Clock for ManualClock {
    fn local_time(&self) -> Option<WallTime> {
        self.now
    }

    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }
}

/// Request as seen by the scripted source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub url: String,
    pub bearer_token: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u32,
}

/// Content source answering from a queue; an empty queue means no WiFi
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pub responses: VecDeque<Result<String, FetchError>>,
    pub requests: Vec<SeenRequest>,
    body: String,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, body: &str) {
        self.responses.push_back(Ok(String::from(body)));
    }

    pub fn fail(&mut self, err: FetchError) {
        self.responses.push_back(Err(err));
    }
}

impl ContentSource for ScriptedSource {
    fn fetch(&mut self, request: &FetchRequest<'_>) -> Result<&str, FetchError> {
        self.requests.push(SeenRequest {
            url: String::from(request.url),
            bearer_token: request.bearer_token.map(String::from),
            api_key: request.api_key.map(String::from),
            timeout_ms: request.timeout_ms,
        });

        match self.responses.pop_front() {
            Some(Ok(body)) => {
                self.body = body;
                Ok(&self.body)
            }
            Some(Err(err)) => Err(err),
            None => Err(FetchError::NetworkUnavailable),
        }
    }
}

/// Refresh issued to the recording panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Full,
    Partial(Rect),
}

/// Panel drawing into a [`Canvas`] and logging each refresh
pub struct RecordingPanel {
    pub canvas: Canvas,
    pub log: Vec<Refresh>,
    /// Partial refreshes of this window fail
    pub fail_window: Option<Rect>,
    pub fail_full: bool,
}

impl RecordingPanel {
    pub fn new() -> Self {
        Self {
            canvas: Canvas::new(),
            log: Vec::new(),
            fail_window: None,
            fail_full: false,
        }
    }
}

impl Panel for RecordingPanel {
    type Canvas = Canvas;
    type Error = ();

    fn full_refresh<F>(&mut self, mut draw: F) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Canvas),
    {
        if self.fail_full {
            return Err(());
        }
        draw(&mut self.canvas);
        self.log.push(Refresh::Full);
        Ok(())
    }

    fn partial_refresh<F>(&mut self, window: Rect, mut draw: F) -> Result<(), Self::Error>
    where
        F: FnMut(&mut Self::Canvas),
    {
        if self.fail_window == Some(window) {
            return Err(());
        }
        draw(&mut self.canvas);
        self.log.push(Refresh::Partial(window));
        Ok(())
    }
}
