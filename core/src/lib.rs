//! Deterministic MediaWiki API client core for langlinks lookups.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `WikiClient` is stateless; it holds only an immutable `ClientConfig`.
//!   A different language means a different client.
//! - Each query is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `LangLinkSearch` drains `continue` chains one request at a time and
//!   reports progress as `SearchEvent`s: one `Batch` per page, then `Done`.
//! - Response maps are read in body order; nothing is re-sorted.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod types;
mod wire;

pub use client::{continuation_segment, WikiClient, USER_AGENT};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::{drive_langlinks, LangLinkSearch};
pub use types::{ContinuationToken, LangLink, LangLinksPage, PageTitle, SearchEvent};
