//! Error types for the wiki API client.
//!
//! # Design
//! One enum covers every failure a logical search can end with. Transport
//! failures are reported by whoever executes the request (the host), while
//! status, shape and API-level errors are detected by the `parse_*` methods.
//! A search that fails never emits `Done`, so callers must treat an `Err` as
//! the end of the search.

use thiserror::Error;

/// Errors returned by `WikiClient` parse methods and the pagination engine.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP round-trip itself failed (connect, TLS, timeout, body read).
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The server returned a status other than 200.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The body is JSON but lacks the `query`/`pages` members.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// MediaWiki reported an error envelope (`{"error": {...}}`).
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    /// The continuation chain did not terminate within the configured bound.
    #[error("continuation exceeded {limit} pages")]
    PageLimitExceeded { limit: usize },

    #[error("invalid language code: {0:?}")]
    InvalidLanguageCode(String),
}
