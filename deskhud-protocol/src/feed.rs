//! Content feed response format
//!
//! The server answers a GET with one JSON object. Every field is optional;
//! groups missing from a response are left untouched by the panel.
//!
//! ```json
//! {
//!   "wx_ver": 4,
//!   "wx": { "buffer": "<base64>", "format": "bitmap", "width": 304, "height": 176 },
//!   "ttl": 5
//! }
//! ```
//!
//! Versions are carried either at the top level (`<key>_ver`) or inside the
//! group object (`version`); the group-level value wins when both are present.
//! A group object without `format` is a bitmap (older servers omit the tag).
//!
//! String fields are JSON-unescaped (`\/`, `\n`, `\uXXXX`). Strings without
//! escapes borrow from the body; only escaped ones are copied.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec;
use core::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::group::ContentGroup;

/// Feed parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Response body was empty
    Empty,
    /// Body is not a well-formed feed object
    Malformed,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty response"),
            Self::Malformed => write!(f, "JSON parse error"),
        }
    }
}

/// Encoding of a group payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadFormat {
    /// Base64 packed 1-bit bitmap sized to the group's region
    Bitmap,
    /// Plain text drawn with the panel font
    Text,
}

const FORMAT_BITMAP: &str = "bitmap";
const FORMAT_TEXT: &str = "text";

impl PayloadFormat {
    /// Resolve a format tag; a missing tag means bitmap
    pub fn from_tag(tag: Option<&str>) -> Option<Self> {
        match tag {
            None | Some(FORMAT_BITMAP) => Some(PayloadFormat::Bitmap),
            Some(FORMAT_TEXT) => Some(PayloadFormat::Text),
            Some(_) => None,
        }
    }

    /// Wire tag for this format
    pub const fn as_str(self) -> &'static str {
        match self {
            PayloadFormat::Bitmap => FORMAT_BITMAP,
            PayloadFormat::Text => FORMAT_TEXT,
        }
    }
}

/// Unescaped string field of the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStr<'a>(Cow<'a, str>);

impl<'a> FeedStr<'a> {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value had to be unescaped into an owned copy
    pub fn is_owned(&self) -> bool {
        matches!(self.0, Cow::Owned(_))
    }
}

impl<'de: 'a, 'a> Deserialize<'de> for FeedStr<'a> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FeedStrVisitor;

        impl<'de> Visitor<'de> for FeedStrVisitor {
            type Value = FeedStr<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string")
            }

            fn visit_borrowed_str<E: de::Error>(self, v: &'de str) -> Result<Self::Value, E> {
                Ok(FeedStr(Cow::Borrowed(v)))
            }

            // Unescaped text lives in a scratch buffer reused for the next string
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FeedStr(Cow::Owned(String::from(v))))
            }
        }

        deserializer.deserialize_str(FeedStrVisitor)
    }
}

/// Raw group object as sent by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupBlock<'a> {
    #[serde(default, borrow)]
    pub buffer: Option<FeedStr<'a>>,
    #[serde(default, borrow)]
    pub format: Option<FeedStr<'a>>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub height: Option<u16>,
}

/// Decoded feed response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedResponse<'a> {
    #[serde(default)]
    pub sentence_ver: Option<u32>,
    #[serde(default)]
    pub wx_ver: Option<u32>,
    #[serde(default)]
    pub cal_ver: Option<u32>,
    #[serde(default)]
    pub note_ver: Option<u32>,
    #[serde(default)]
    pub forecast_ver: Option<u32>,
    #[serde(default)]
    pub global_ver: Option<u32>,
    #[serde(default, borrow)]
    pub sentence: Option<GroupBlock<'a>>,
    #[serde(default, borrow)]
    pub wx: Option<GroupBlock<'a>>,
    #[serde(default, borrow)]
    pub cal: Option<GroupBlock<'a>>,
    #[serde(default, borrow)]
    pub note: Option<GroupBlock<'a>>,
    #[serde(default, borrow)]
    pub forecast: Option<GroupBlock<'a>>,
    /// Fetch interval override in minutes
    #[serde(default)]
    pub ttl: Option<u32>,
}

/// Payload carried by a group update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Payload<'a> {
    pub format: PayloadFormat,
    pub data: &'a str,
    /// Declared bitmap width; the region width applies when absent
    pub width: Option<u16>,
    /// Declared bitmap height; the region height applies when absent
    pub height: Option<u16>,
}

/// Normalized view of one group in a response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroupUpdate<'a> {
    /// Declared version, if any
    pub version: Option<u32>,
    /// Payload in a supported format, if any
    pub payload: Option<Payload<'a>>,
    /// A payload was sent in a format this panel cannot draw
    pub unsupported_format: bool,
}

impl<'a> FeedResponse<'a> {
    fn block(&self, group: ContentGroup) -> Option<&GroupBlock<'a>> {
        match group {
            ContentGroup::Sentence => self.sentence.as_ref(),
            ContentGroup::Weather => self.wx.as_ref(),
            ContentGroup::Calendar => self.cal.as_ref(),
            ContentGroup::Notes => self.note.as_ref(),
            ContentGroup::Forecast => self.forecast.as_ref(),
        }
    }

    fn top_level_version(&self, group: ContentGroup) -> Option<u32> {
        match group {
            ContentGroup::Sentence => self.sentence_ver,
            ContentGroup::Weather => self.wx_ver,
            ContentGroup::Calendar => self.cal_ver,
            ContentGroup::Notes => self.note_ver,
            ContentGroup::Forecast => self.forecast_ver,
        }
    }

    /// Extract the update for one group
    ///
    /// Returns `None` when the response says nothing about the group.
    pub fn group(&self, group: ContentGroup) -> Option<GroupUpdate<'_>> {
        let block = self.block(group);
        let version = block
            .and_then(|b| b.version)
            .or_else(|| self.top_level_version(group));

        if block.is_none() && version.is_none() {
            return None;
        }

        let mut update = GroupUpdate {
            version,
            payload: None,
            unsupported_format: false,
        };

        if let Some(GroupBlock {
            buffer: Some(data),
            format,
            width,
            height,
            ..
        }) = block
        {
            match PayloadFormat::from_tag(format.as_ref().map(FeedStr::as_str)) {
                Some(format) => {
                    update.payload = Some(Payload {
                        format,
                        data: data.as_str(),
                        width: *width,
                        height: *height,
                    })
                }
                None => update.unsupported_format = true,
            }
        }

        Some(update)
    }
}

/// Parse a feed response body
///
/// String fields borrow from `json` unless they carry escapes.
pub fn parse_feed(json: &str) -> Result<FeedResponse<'_>, ParseError> {
    if json.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    // An unescaped string is never longer than its escaped form
    let mut scratch = vec![0u8; json.len()];
    serde_json_core::from_str_escaped(json, &mut scratch)
        .map(|(feed, _)| feed)
        .map_err(|_| ParseError::Malformed)
}
