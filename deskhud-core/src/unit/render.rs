//! Drawing primitives for update units
//!
//! All drawing is 1-bit: `BinaryColor::On` is ink (black) and
//! `BinaryColor::Off` is paper (white).

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder, StrokeAlignment};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use deskhud_protocol::Bitmap;

use crate::layout::Rect;
use crate::store::StatusBoard;

pub const INK: BinaryColor = BinaryColor::On;
pub const PAPER: BinaryColor = BinaryColor::Off;

/// Inner margin for text content
const TEXT_MARGIN: u32 = 4;

/// Segment masks for 0-9, bit 0 = a ... bit 6 = g
const SEGMENT_MASKS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Fill `rect` with paper
pub fn clear<D>(target: &mut D, rect: Rect) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fill(target, rect, PAPER)
}

fn fill<D>(target: &mut D, rect: Rect, color: BinaryColor) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    rect.to_rectangle()
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
}

/// One pixel ink border just inside `rect`
pub fn border<D>(target: &mut D, rect: Rect) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = PrimitiveStyleBuilder::new()
        .stroke_color(INK)
        .stroke_width(1)
        .stroke_alignment(StrokeAlignment::Inside)
        .build();
    rect.to_rectangle().into_styled(style).draw(target)
}

/// Blit the ink pixels of `bitmap` with its top-left at the corner of `rect`
///
/// Paper pixels are skipped; callers clear the rectangle first.
pub fn blit<D>(target: &mut D, rect: Rect, bitmap: &Bitmap<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let bitmap = *bitmap;
    let width = bitmap.width().min(rect.width);
    let rows = bitmap.rows_available().min(rect.height);

    let pixels = (0..rows).flat_map(move |y| {
        (0..width).filter_map(move |x| match bitmap.pixel(x, y) {
            Some(false) => Some(Pixel(
                Point::new((rect.x + x) as i32, (rect.y + y) as i32),
                INK,
            )),
            _ => None,
        })
    });
    target.draw_iter(pixels)
}

/// Draw lines of text inside `rect`, clipped to it
pub fn text_block<D>(target: &mut D, rect: Rect, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_lines(target, rect, &FONT_10X20, text.lines())
}

fn draw_lines<'a, D, I>(
    target: &mut D,
    rect: Rect,
    font: &MonoFont<'_>,
    lines: I,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
    I: IntoIterator<Item = &'a str>,
{
    let area = rect.to_rectangle();
    let mut clipped = target.clipped(&area);
    let style = MonoTextStyle::new(font, INK);
    let line_height = font.character_size.height + 2;

    let mut y = rect.y + TEXT_MARGIN;
    for line in lines {
        if y >= rect.bottom() {
            break;
        }
        Text::with_baseline(
            line,
            Point::new((rect.x + TEXT_MARGIN) as i32, y as i32),
            style,
            Baseline::Top,
        )
        .draw(&mut clipped)?;
        y += line_height;
    }
    Ok(())
}

/// Status lines: message, WiFi state, last sync and last error
pub fn status_lines<D>(target: &mut D, rect: Rect, status: &StatusBoard) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut wifi: String<24> = String::new();
    let _ = write!(
        wifi,
        "WiFi: {}",
        if status.wifi_connected() {
            "connected"
        } else {
            "disconnected"
        }
    );

    let mut sync: String<24> = String::new();
    let last = status.last_sync();
    let _ = write!(sync, "Sync: {}", if last.is_empty() { "--:--:--" } else { last });

    let mut error: String<64> = String::new();
    if !status.error().is_empty() {
        let _ = write!(error, "Error: {}", status.error());
    }

    let lines = [status.message(), wifi.as_str(), sync.as_str(), error.as_str()];
    draw_lines(
        target,
        rect,
        &FONT_6X10,
        lines.into_iter().filter(|l| !l.is_empty()),
    )
}

/// Draw "HH:MM" as seven-segment digits centred in `rect`
///
/// Anything that is not five characters with a digit at each digit
/// position draws nothing.
pub fn seven_segment_clock<D>(target: &mut D, rect: Rect, hhmm: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let bytes = hhmm.as_bytes();
    if bytes.len() != 5 {
        return Ok(());
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Ok(());
    }

    let digit_h = rect.height * 2 / 3;
    let digit_w = digit_h / 2;
    let thick = (digit_h / 10).max(2);
    let gap = thick;
    let colon_w = thick * 3;
    let total = digit_w * 4 + gap * 4 + colon_w;

    let mut x = rect.x + rect.width.saturating_sub(total) / 2;
    let y = rect.y + (rect.height - digit_h) / 2;

    for (i, digit) in digits.iter().enumerate() {
        let cell = Rect::new(x, y, digit_w, digit_h);
        segment_digit(target, cell, thick, SEGMENT_MASKS[(digit - b'0') as usize])?;
        x += digit_w + gap;

        if i == 1 {
            let dot_x = x + (colon_w - thick) / 2;
            fill(target, Rect::new(dot_x, y + digit_h / 3, thick, thick), INK)?;
            fill(target, Rect::new(dot_x, y + digit_h * 2 / 3, thick, thick), INK)?;
            x += colon_w + gap;
        }
    }
    Ok(())
}

fn segment_digit<D>(target: &mut D, cell: Rect, t: u32, mask: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = cell;
    let half = h / 2;
    let span = w.saturating_sub(2 * t);
    let upper = half.saturating_sub(t);
    let lower = (h - half).saturating_sub(t);

    let segments = [
        Rect::new(x + t, y, span, t),                     // a
        Rect::new(x + w - t, y + t, t, upper),            // b
        Rect::new(x + w - t, y + half, t, lower),         // c
        Rect::new(x + t, y + h - t, span, t),             // d
        Rect::new(x, y + half, t, lower),                 // e
        Rect::new(x, y + t, t, upper),                    // f
        Rect::new(x + t, y + half - t / 2, span, t),      // g
    ];

    for (bit, segment) in segments.iter().enumerate() {
        if mask & (1 << bit) != 0 {
            fill(target, *segment, INK)?;
        }
    }
    Ok(())
}
