//! Errors raised at the catalog HTTP boundary.

use thiserror::Error;

/// A failed backend request.
///
/// Callers only distinguish "failed" from "succeeded"; the variants exist so
/// the log says why.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, timeout or other transport failure
    #[error("request failed: {0}")]
    Transport(String),
    /// Backend answered with a non-success status
    #[error("backend returned status {0}")]
    Status(u16),
    /// Body was not the expected JSON shape
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
