//! Content source trait

use crate::error::FetchError;

/// One request to the content server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchRequest<'a> {
    /// Feed URL
    pub url: &'a str,
    /// Sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<&'a str>,
    /// Sent as `X-API-Key`
    pub api_key: Option<&'a str>,
    /// Give up after this long (ms)
    pub timeout_ms: u32,
}

/// Trait for fetching the raw feed
///
/// Implementations wrap the board's HTTP client. The call blocks until the
/// whole body has arrived or the request has failed; it must not block
/// longer than `request.timeout_ms`.
pub trait ContentSource {
    /// Perform one GET and return the response body
    ///
    /// The body stays borrowed from the source until the next call.
    fn fetch(&mut self, request: &FetchRequest<'_>) -> Result<&str, FetchError>;
}
