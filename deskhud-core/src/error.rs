//! Error types
//!
//! Nothing here is fatal. Fetch and merge failures are retried by the
//! coordinator and surfaced as a status string; render failures skip one
//! region for one cycle.

use core::fmt;

use deskhud_protocol::{BitmapError, ParseError};

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// No network connectivity
    NetworkUnavailable,
    /// Server answered with an error status or the transfer broke off
    HttpError,
    /// Response body is not a valid feed
    ParseError,
    /// Payload is not valid base64
    DecodeError,
    /// Payload does not fit the decode buffer
    OversizeError,
}

impl ErrorKind {
    /// Short label for logs
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NetworkUnavailable => "network unavailable",
            ErrorKind::HttpError => "http error",
            ErrorKind::ParseError => "parse error",
            ErrorKind::DecodeError => "decode error",
            ErrorKind::OversizeError => "oversize error",
        }
    }
}

/// Transport failure reported by a content source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// WiFi is not associated
    NetworkUnavailable,
    /// Non-success HTTP status code (or a negative client error code)
    HttpError(u16),
    /// No response within the request timeout
    Timeout,
    /// Connection closed without a body
    EmptyResponse,
}

impl FetchError {
    pub const fn kind(self) -> ErrorKind {
        match self {
            FetchError::NetworkUnavailable => ErrorKind::NetworkUnavailable,
            FetchError::HttpError(_) | FetchError::Timeout => ErrorKind::HttpError,
            FetchError::EmptyResponse => ErrorKind::ParseError,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NetworkUnavailable => write!(f, "WiFi not connected"),
            FetchError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FetchError::Timeout => write!(f, "Read timeout"),
            FetchError::EmptyResponse => write!(f, "Empty response"),
        }
    }
}

/// Merge failure; the store is left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MergeError {
    Parse(ParseError),
}

impl MergeError {
    pub const fn kind(self) -> ErrorKind {
        match self {
            MergeError::Parse(_) => ErrorKind::ParseError,
        }
    }
}

impl From<ParseError> for MergeError {
    fn from(err: ParseError) -> Self {
        MergeError::Parse(err)
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::Parse(err) => err.fmt(f),
        }
    }
}

impl From<BitmapError> for ErrorKind {
    fn from(err: BitmapError) -> Self {
        match err {
            BitmapError::Decode => ErrorKind::DecodeError,
            BitmapError::Oversize => ErrorKind::OversizeError,
        }
    }
}
