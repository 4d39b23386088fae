//! Update units
//!
//! One unit per screen region. A unit keeps its own clock-aligned cadence,
//! the last source version it has seen and a dirty flag. Only
//! [`UpdateUnit::sync_from_store`] sets the flag and only
//! [`UpdateUnit::mark_updated`] (called by the coordinator after a
//! successful draw) clears it.
//!
//! Most regions are content-backed and differ only in which content group
//! they bind to. The clock and status regions watch locally produced data.

pub mod render;

use alloc::vec;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;
use heapless::String;

use deskhud_protocol::{decode_base64, required_bytes, Bitmap, BitmapError, ContentGroup, PayloadFormat};

use crate::config::{RefreshClass, UnitConfig};
use crate::error::ErrorKind;
use crate::layout::{Rect, Region, WINDOW_ALIGN};
use crate::schedule::AlignedSchedule;
use crate::store::{DataStore, StoredPayload};
use crate::time::WallTime;

/// What a unit draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnitKind {
    /// Server content group (bitmap or text)
    Content(ContentGroup),
    /// Local time, as seven-segment HH:MM
    Clock,
    /// Local status fields
    Status,
}

impl UnitKind {
    /// What each region shows
    pub const fn for_region(region: Region) -> Self {
        match region {
            Region::Sentence => UnitKind::Content(ContentGroup::Sentence),
            Region::Calendar => UnitKind::Content(ContentGroup::Calendar),
            Region::Notes => UnitKind::Content(ContentGroup::Notes),
            Region::Weather => UnitKind::Content(ContentGroup::Weather),
            Region::Free => UnitKind::Content(ContentGroup::Forecast),
            Region::Time => UnitKind::Clock,
            Region::Status => UnitKind::Status,
        }
    }
}

/// Result of a render call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderOutcome {
    /// Region was redrawn
    Drawn,
    /// Payload could not be drawn; the region was left as it was
    Skipped(ErrorKind),
}

/// One screen region with its own cadence and dirty tracking
#[derive(Debug, Clone)]
pub struct UpdateUnit {
    region: Region,
    rect: Rect,
    kind: UnitKind,
    refresh: RefreshClass,
    schedule: AlignedSchedule,
    dirty: bool,
    seen_version: u32,
    seen_minute: String<5>,
}

impl UpdateUnit {
    pub fn new(region: Region, config: &UnitConfig) -> Self {
        Self {
            region,
            rect: region.rect().align_horizontal(WINDOW_ALIGN),
            kind: UnitKind::for_region(region),
            refresh: config.refresh,
            schedule: AlignedSchedule::new(config.interval_minutes),
            dirty: false,
            seen_version: 0,
            seen_minute: String::new(),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Refresh window (horizontally aligned)
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn refresh_class(&self) -> RefreshClass {
        self.refresh
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Last source version observed (content version or status revision)
    pub fn seen_version(&self) -> u32 {
        self.seen_version
    }

    pub fn next_update(&self) -> Option<WallTime> {
        self.schedule.next_due()
    }

    /// Whether the unit's cadence has come due
    ///
    /// Stays true until [`mark_updated`](Self::mark_updated) advances it.
    pub fn should_update(&mut self, now: Option<WallTime>) -> bool {
        self.schedule.poll(now)
    }

    /// Clear the dirty flag and advance the cadence past `now`
    pub fn mark_updated(&mut self, now: Option<WallTime>) {
        self.dirty = false;
        self.schedule.advance(now);
    }

    /// Compare the cached source version with the store
    ///
    /// On a difference the cache is updated, the unit goes dirty and
    /// `true` is returned.
    pub fn sync_from_store(&mut self, store: &DataStore) -> bool {
        let changed = match self.kind {
            UnitKind::Content(group) => observe(&mut self.seen_version, store.version(group)),
            UnitKind::Status => observe(&mut self.seen_version, store.status().revision()),
            UnitKind::Clock => {
                let minute = store.status().local_minute();
                if minute != self.seen_minute.as_str() {
                    self.seen_minute.clear();
                    let _ = self.seen_minute.push_str(minute);
                    true
                } else {
                    false
                }
            }
        };

        if changed {
            trace!("unit {}: source changed", self.region.name());
            self.dirty = true;
        }
        changed
    }

    /// Draw the unit into its rectangle
    ///
    /// Undecodable or oversized bitmaps are reported as skipped and leave
    /// the rectangle untouched. Calling this twice with the same store
    /// yields the same pixels.
    pub fn render<D>(&self, store: &DataStore, target: &mut D) -> Result<RenderOutcome, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        match self.kind {
            UnitKind::Content(group) => match store.payload(group) {
                Some(payload) => self.render_payload(payload, target),
                None => {
                    render::clear(target, self.rect)?;
                    render::border(target, self.rect)?;
                    Ok(RenderOutcome::Drawn)
                }
            },
            UnitKind::Clock => {
                render::clear(target, self.rect)?;
                render::seven_segment_clock(target, self.rect, &self.seen_minute)?;
                render::border(target, self.rect)?;
                Ok(RenderOutcome::Drawn)
            }
            UnitKind::Status => {
                render::clear(target, self.rect)?;
                render::status_lines(target, self.rect, store.status())?;
                render::border(target, self.rect)?;
                Ok(RenderOutcome::Drawn)
            }
        }
    }

    fn render_payload<D>(&self, payload: &StoredPayload, target: &mut D) -> Result<RenderOutcome, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        match payload.format {
            PayloadFormat::Text => {
                render::clear(target, self.rect)?;
                render::text_block(target, self.rect, &payload.data)?;
            }
            PayloadFormat::Bitmap => {
                let width = payload.width.map_or(self.rect.width, u32::from);
                let height = payload.height.map_or(self.rect.height, u32::from);

                let decoded = decode_bitmap(&payload.data, width, height, self.rect);
                let (buffer, len) = match decoded {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        warn!("unit {}: {}", self.region.name(), err);
                        return Ok(RenderOutcome::Skipped(err.into()));
                    }
                };

                render::clear(target, self.rect)?;
                render::blit(target, self.rect, &Bitmap::new(width, height, &buffer[..len]))?;
            }
        }

        render::border(target, self.rect)?;
        Ok(RenderOutcome::Drawn)
    }
}

/// Decode a bitmap payload that must fit inside `rect`
fn decode_bitmap(
    data: &str,
    width: u32,
    height: u32,
    rect: Rect,
) -> Result<(alloc::vec::Vec<u8>, usize), BitmapError> {
    if width > rect.width || height > rect.height {
        return Err(BitmapError::Oversize);
    }
    let bytes = required_bytes(width, height)?;
    let mut buffer = vec![0u8; bytes];
    let len = decode_base64(data, &mut buffer)?;
    Ok((buffer, len))
}

fn observe(seen: &mut u32, current: u32) -> bool {
    if *seen != current {
        *seen = current;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchConfig, PanelConfig};
    use crate::testing::Canvas;

    fn unit(region: Region) -> UpdateUnit {
        UpdateUnit::new(region, PanelConfig::default().unit(region))
    }

    fn store() -> DataStore {
        DataStore::new(&FetchConfig::default())
    }

    #[test]
    fn test_sync_tracks_versions() {
        let mut store = store();
        let mut weather = unit(Region::Weather);

        store.merge(r#"{"wx_ver": 3}"#).unwrap();
        assert!(weather.sync_from_store(&store));
        weather.mark_updated(None);

        // Cache already at 3: no change, flag untouched
        assert!(!weather.sync_from_store(&store));
        assert!(!weather.is_dirty());

        store.merge(r#"{"wx_ver": 4}"#).unwrap();
        assert!(weather.sync_from_store(&store));
        assert!(weather.is_dirty());
        assert_eq!(weather.seen_version(), 4);
    }

    #[test]
    fn test_dirty_survives_until_marked() {
        let mut store = store();
        let mut notes = unit(Region::Notes);

        store.merge(r#"{"note_ver": 1}"#).unwrap();
        assert!(notes.sync_from_store(&store));
        assert!(!notes.sync_from_store(&store));
        assert!(notes.is_dirty());

        let mut canvas = Canvas::new();
        notes.render(&store, &mut canvas).unwrap();
        assert!(notes.is_dirty());

        notes.mark_updated(Some(WallTime::new(2025, 6, 1, 9, 0, 0)));
        assert!(!notes.is_dirty());
        assert!(!notes.sync_from_store(&store));
        assert!(!notes.is_dirty());
    }

    #[test]
    fn test_clock_unit_watches_minutes() {
        let mut store = store();
        let mut clock = unit(Region::Time);

        // No time yet
        assert!(!clock.sync_from_store(&store));

        store
            .status_mut()
            .set_local_time(&WallTime::new(2025, 6, 1, 9, 41, 5));
        assert!(clock.sync_from_store(&store));
        clock.mark_updated(None);

        store
            .status_mut()
            .set_local_time(&WallTime::new(2025, 6, 1, 9, 41, 59));
        assert!(!clock.sync_from_store(&store));

        store
            .status_mut()
            .set_local_time(&WallTime::new(2025, 6, 1, 9, 42, 0));
        assert!(clock.sync_from_store(&store));
    }

    #[test]
    fn test_status_unit_watches_revision() {
        let mut store = store();
        let mut status = unit(Region::Status);

        assert!(!status.sync_from_store(&store));
        store.status_mut().set_wifi_connected(true);
        assert!(status.sync_from_store(&store));
    }

    #[test]
    fn test_should_update_follows_cadence() {
        let mut notes = unit(Region::Notes);
        assert!(!notes.should_update(None));
        assert!(!notes.should_update(Some(WallTime::new(2025, 6, 1, 9, 1, 0))));
        assert_eq!(notes.next_update(), Some(WallTime::new(2025, 6, 1, 9, 5, 0)));
        assert!(notes.should_update(Some(WallTime::new(2025, 6, 1, 9, 5, 0))));

        notes.mark_updated(Some(WallTime::new(2025, 6, 1, 9, 5, 0)));
        assert_eq!(notes.next_update(), Some(WallTime::new(2025, 6, 1, 9, 10, 0)));
    }

    #[test]
    fn test_render_bitmap() {
        let mut store = store();
        // 304 x 3 all-ink bitmap: 38 zero bytes per row
        let buffer = "A".repeat(152);
        store
            .merge(&std::format!(
                r#"{{"sentence_ver": 1, "sentence": {{"buffer": "{}", "width": 304, "height": 3}}}}"#,
                buffer
            ))
            .unwrap();

        let sentence = unit(Region::Sentence);
        let mut canvas = Canvas::new();
        let outcome = sentence.render(&store, &mut canvas).unwrap();
        assert_eq!(outcome, RenderOutcome::Drawn);

        // Bitmap rows are ink, the rest of the region is paper
        assert_eq!(canvas.at(10, 2), Some(BinaryColor::On));
        assert_eq!(canvas.at(303, 2), Some(BinaryColor::On));
        assert_eq!(canvas.at(304, 2), Some(BinaryColor::Off));
        assert_eq!(canvas.at(10, 3), Some(BinaryColor::Off));
        assert_eq!(canvas.at(400, 20), Some(BinaryColor::Off));

        // Border
        assert_eq!(canvas.at(0, 20), Some(BinaryColor::On));
        assert_eq!(canvas.at(799, 20), Some(BinaryColor::On));

        // Nothing outside the region
        assert_eq!(canvas.at(10, 56), None);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut store = store();
        store
            .merge(r#"{"note_ver": 2, "note": {"buffer": "Buy milk", "format": "text"}}"#)
            .unwrap();
        let notes = unit(Region::Notes);

        let mut first = Canvas::new();
        notes.render(&store, &mut first).unwrap();
        let mut second = Canvas::new();
        notes.render(&store, &mut second).unwrap();
        notes.render(&store, &mut second).unwrap();

        assert_eq!(first.pixels, second.pixels);
        assert!(first.touched() > 0);
    }

    #[test]
    fn test_bad_bitmap_leaves_region_untouched() {
        let mut store = store();
        store
            .merge(r#"{"wx_ver": 1, "wx": {"buffer": "not*base64"}}"#)
            .unwrap();
        let weather = unit(Region::Weather);
        let mut canvas = Canvas::new();

        let outcome = weather.render(&store, &mut canvas).unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(ErrorKind::DecodeError));
        assert_eq!(canvas.touched(), 0);
    }

    #[test]
    fn test_oversize_bitmap_is_skipped() {
        let mut store = store();
        store
            .merge(r#"{"cal_ver": 1, "cal": {"buffer": "AAAA", "width": 800, "height": 480}}"#)
            .unwrap();
        let calendar = unit(Region::Calendar);
        let mut canvas = Canvas::new();

        let outcome = calendar.render(&store, &mut canvas).unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped(ErrorKind::OversizeError));
        assert_eq!(canvas.touched(), 0);
    }

    #[test]
    fn test_clock_render_draws_digits() {
        let mut store = store();
        store
            .status_mut()
            .set_local_time(&WallTime::new(2025, 6, 1, 18, 8, 0));
        let mut clock = unit(Region::Time);
        clock.sync_from_store(&store);

        let mut canvas = Canvas::new();
        clock.render(&store, &mut canvas).unwrap();

        let rect = clock.rect();
        let ink = (rect.y + 1..rect.bottom() - 1)
            .flat_map(|y| (rect.x + 1..rect.right() - 1).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.at(x, y) == Some(BinaryColor::On))
            .count();
        assert!(ink > 1000);
    }

    #[test]
    fn test_empty_content_draws_border_only() {
        let store = store();
        let free = unit(Region::Free);
        assert_eq!(free.kind(), UnitKind::Content(ContentGroup::Forecast));

        let mut canvas = Canvas::new();
        free.render(&store, &mut canvas).unwrap();
        let rect = free.rect();
        assert_eq!(canvas.at(rect.x, rect.y + 10), Some(BinaryColor::On));
        assert_eq!(canvas.at(rect.x + 10, rect.y + 10), Some(BinaryColor::Off));
    }
}
