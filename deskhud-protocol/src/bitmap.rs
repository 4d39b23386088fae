//! Packed 1-bit bitmap codec
//!
//! Region content arrives as base64 text wrapping a packed bitmap:
//! - Rows are padded to a multiple of 8 pixels (e.g. 500 px wide → 63 bytes)
//! - Bits are MSB first, left to right, rows top to bottom
//! - Bit 1 is paper (white), bit 0 is ink (black)
//!
//! Decoding never writes past the caller's buffer: surplus bytes are dropped.

/// Largest bitmap the panel will decode (bytes)
pub const MAX_BITMAP_BYTES: usize = 16384;

/// Bitmap decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitmapError {
    /// Payload is not valid base64
    Decode,
    /// Bitmap would not fit the decode buffer
    Oversize,
}

impl core::fmt::Display for BitmapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Decode => write!(f, "Bitmap decode error"),
            Self::Oversize => write!(f, "Bitmap too large"),
        }
    }
}

/// Bytes per packed row for a given pixel width
pub const fn row_stride(width: u32) -> usize {
    width.div_ceil(8) as usize
}

/// Bytes needed for a `width` x `height` bitmap
///
/// Fails with `Oversize` above [`MAX_BITMAP_BYTES`].
pub fn required_bytes(width: u32, height: u32) -> Result<usize, BitmapError> {
    let bytes = row_stride(width)
        .checked_mul(height as usize)
        .ok_or(BitmapError::Oversize)?;
    if bytes > MAX_BITMAP_BYTES {
        return Err(BitmapError::Oversize);
    }
    Ok(bytes)
}

/// Padding marker in the sextet table
const PAD: u8 = 0xFE;
/// Invalid character marker
const INVALID: u8 = 0xFF;

fn sextet(c: u8) -> u8 {
    match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        b'=' => PAD,
        _ => INVALID,
    }
}

/// Decode standard base64 into `out`
///
/// Whitespace is skipped. Output beyond `out.len()` is discarded, so a payload
/// larger than its region is truncated rather than overflowing. Returns the
/// number of bytes written.
pub fn decode_base64(input: &str, out: &mut [u8]) -> Result<usize, BitmapError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut written = 0usize;
    let mut symbols = 0usize;
    let mut padded = false;

    for &c in input.as_bytes() {
        if c.is_ascii_whitespace() {
            continue;
        }

        match sextet(c) {
            INVALID => return Err(BitmapError::Decode),
            PAD => {
                padded = true;
            }
            value => {
                // Data after padding is malformed
                if padded {
                    return Err(BitmapError::Decode);
                }
                symbols += 1;
                acc = ((acc << 6) | value as u32) & 0xFFF;
                bits += 6;
                if bits >= 8 {
                    bits -= 8;
                    if let Some(slot) = out.get_mut(written) {
                        *slot = (acc >> bits) as u8;
                        written += 1;
                    }
                }
            }
        }
    }

    if symbols == 0 {
        return Err(BitmapError::Decode);
    }

    Ok(written)
}

/// Read-only view over a packed bitmap
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Wrap packed data for a `width` x `height` bitmap
    ///
    /// `data` may be shorter than the full bitmap; missing rows read as absent.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of complete or partial rows backed by data
    pub fn rows_available(&self) -> u32 {
        let stride = row_stride(self.width);
        if stride == 0 {
            return 0;
        }
        (self.data.len().div_ceil(stride) as u32).min(self.height)
    }

    /// Pixel at (x, y): `Some(true)` for paper, `Some(false)` for ink
    ///
    /// Returns `None` outside the bitmap or past the end of the data.
    pub fn pixel(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * row_stride(self.width) + (x / 8) as usize;
        let byte = self.data.get(index)?;
        Some(byte & (0x80 >> (x % 8)) != 0)
    }
}
