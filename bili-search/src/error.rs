//! Search client error types.

use thiserror::Error;

/// Failures a search call can actually raise.
///
/// Protocol-level rejections (non-zero upstream codes such as `-400`, `-412`
/// or `-1200`) are not errors: they come back as data on the result
/// containers so callers can branch on rate limiting versus bad parameters.
/// Per-field parse problems degrade to defaults inside the parser and never
/// surface here.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The request never completed: connect/TLS failure, timeout,
    /// cancellation, or a response body that was not JSON.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The key source response did not contain the expected URL-shaped
    /// fields, or the extracted keys were unusable.
    #[error("malformed key source: {0}")]
    MalformedKeySource(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamUnavailable(err.to_string())
    }
}

impl From<bili_wbi::WbiError> for SearchError {
    fn from(err: bili_wbi::WbiError) -> Self {
        Self::MalformedKeySource(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
