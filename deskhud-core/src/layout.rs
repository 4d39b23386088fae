//! Screen regions
//!
//! Fixed mapping from content areas to pixel rectangles on the
//! 800x480 landscape panel:
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Sentence                                      │
//! ├─────────────────────────────┬─────────────────┤
//! │ Calendar                    │ Weather         │
//! ├─────────────────────────────┤                 │
//! │ Time                        ├─────────────────┤
//! │                             │ Free            │
//! ├─────────────────────────────┤                 │
//! │ Notes                       ├─────────────────┤
//! │                             │ Status          │
//! └─────────────────────────────┴─────────────────┘
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel width in pixels
pub const SCREEN_WIDTH: u32 = 800;
/// Panel height in pixels
pub const SCREEN_HEIGHT: u32 = 480;

/// Horizontal alignment required for partial refresh windows
pub const WINDOW_ALIGN: u32 = 16;

/// Number of regions
pub const REGION_COUNT: usize = 7;

/// Pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whole panel
    pub const fn screen() -> Self {
        Self::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Exclusive right edge
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Snap the left edge down and the right edge up to multiples of `align`
    ///
    /// The result always contains the original rectangle.
    pub const fn align_horizontal(self, align: u32) -> Self {
        if align <= 1 {
            return self;
        }
        let left = self.x / align * align;
        let right = self.right().div_ceil(align) * align;
        Self::new(left, self.y, right - left, self.height)
    }

    /// Whether `other` lies entirely inside this rectangle
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether (x, y) lies inside this rectangle
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// As an `embedded-graphics` rectangle
    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x as i32, self.y as i32),
            Size::new(self.width, self.height),
        )
    }
}

/// Logical content area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Region {
    Sentence,
    Calendar,
    Time,
    Notes,
    Weather,
    Free,
    Status,
}

impl Region {
    /// All regions in drawing order
    pub const ALL: [Region; REGION_COUNT] = [
        Region::Sentence,
        Region::Calendar,
        Region::Time,
        Region::Notes,
        Region::Weather,
        Region::Free,
        Region::Status,
    ];

    /// Stable index into per-region tables
    pub const fn index(self) -> usize {
        match self {
            Region::Sentence => 0,
            Region::Calendar => 1,
            Region::Time => 2,
            Region::Notes => 3,
            Region::Weather => 4,
            Region::Free => 5,
            Region::Status => 6,
        }
    }

    /// Unaligned pixel rectangle
    pub const fn rect(self) -> Rect {
        match self {
            Region::Sentence => Rect::new(0, 0, 800, 56),
            Region::Calendar => Rect::new(0, 56, 496, 120),
            Region::Time => Rect::new(0, 176, 496, 176),
            Region::Notes => Rect::new(0, 352, 496, 128),
            Region::Weather => Rect::new(496, 56, 304, 176),
            Region::Free => Rect::new(496, 232, 304, 192),
            Region::Status => Rect::new(496, 424, 304, 56),
        }
    }

    /// Name used in configuration files
    pub const fn name(self) -> &'static str {
        match self {
            Region::Sentence => "sentence",
            Region::Calendar => "calendar",
            Region::Time => "time",
            Region::Notes => "notes",
            Region::Weather => "weather",
            Region::Free => "free",
            Region::Status => "status",
        }
    }

    /// Look up a region by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_fit_screen() {
        let screen = Rect::screen();
        for region in Region::ALL {
            assert!(screen.contains_rect(&region.rect()), "{:?}", region);
        }
    }

    #[test]
    fn test_regions_do_not_overlap() {
        for a in Region::ALL {
            for b in Region::ALL {
                if a == b {
                    continue;
                }
                let (ra, rb) = (a.rect(), b.rect());
                let disjoint = ra.right() <= rb.x
                    || rb.right() <= ra.x
                    || ra.bottom() <= rb.y
                    || rb.bottom() <= ra.y;
                assert!(disjoint, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_regions_cover_screen() {
        let area: u32 = Region::ALL
            .iter()
            .map(|r| r.rect().width * r.rect().height)
            .sum();
        assert_eq!(area, SCREEN_WIDTH * SCREEN_HEIGHT);
    }

    #[test]
    fn test_align_horizontal() {
        let r = Rect::new(5, 10, 20, 8).align_horizontal(16);
        assert_eq!(r, Rect::new(0, 10, 32, 8));

        // Already aligned regions are unchanged
        for region in Region::ALL {
            let rect = region.rect();
            assert_eq!(rect.align_horizontal(WINDOW_ALIGN), rect);
        }
    }

    #[test]
    fn test_region_names() {
        for region in Region::ALL {
            assert_eq!(Region::from_name(region.name()), Some(region));
        }
        assert_eq!(Region::from_name("clock"), None);
    }

    #[test]
    fn test_indices_are_dense() {
        for (i, region) in Region::ALL.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }
}
