//! Stateless HTTP request builder and response parser for the MediaWiki API.
//!
//! # Design
//! `WikiClient` holds only its frozen `ClientConfig` and carries no mutable
//! state between calls. Each query is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.
//!
//! Query parameters are emitted in a fixed order so that request URLs are
//! reproducible. Fixed values are written literally (`llprop=langname|url`);
//! caller-supplied values are percent-encoded.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::pagination::LangLinkSearch;
use crate::types::{ContinuationToken, LangLink, LangLinksPage, PageTitle};
use crate::wire::{LangLinksEntry, Pages, QueryResponse, TitleEntry};

/// Sent with every request; Wikimedia asks API clients to identify themselves.
pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (langlinks lookup)"
);

/// Synchronous, stateless client for the MediaWiki query API.
#[derive(Debug, Clone)]
pub struct WikiClient {
    config: ClientConfig,
}

impl WikiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Shorthand for `WikiClient::new(ClientConfig::new(language_code)?)`.
    pub fn for_language(language_code: &str) -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::new(language_code)?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a logical langlinks search for `search_term`.
    pub fn langlinks_search(&self, search_term: &str) -> LangLinkSearch {
        LangLinkSearch::new(self.clone(), search_term)
    }

    /// One page of `prop=langlinks` for `search_term`, resuming at
    /// `continuation`. An empty token produces the `continue=` marker that
    /// opts a first request into the current continuation protocol.
    pub fn build_langlinks(&self, search_term: &str, continuation: &ContinuationToken) -> HttpRequest {
        let query = [
            "action=query".to_string(),
            "format=json".to_string(),
            "prop=langlinks".to_string(),
            "llprop=langname|url".to_string(),
            format!("titles={}", urlencoding::encode(search_term)),
            continuation_segment(continuation),
        ]
        .join("&");
        self.get(query)
    }

    /// A single prefix-search request; autocomplete never paginates.
    pub fn build_autocomplete(&self, term: &str) -> HttpRequest {
        let query = [
            "action=query".to_string(),
            "format=json".to_string(),
            "generator=prefixsearch".to_string(),
            format!("gpslimit={}", self.config.autocomplete_limit()),
            "gpsnamespace=0".to_string(),
            "prop=pageprops".to_string(),
            "ppprop=displaytitle".to_string(),
            format!("gpssearch={}", urlencoding::encode(term)),
        ]
        .join("&");
        self.get(query)
    }

    pub fn parse_langlinks(&self, response: HttpResponse) -> Result<LangLinksPage, ApiError> {
        let body: QueryResponse<LangLinksEntry> = decode(&response)?;
        let pages = body
            .query
            .ok_or_else(|| ApiError::MalformedResponse("missing `query` member".to_string()))?
            .pages
            .ok_or_else(|| ApiError::MalformedResponse("missing `query.pages` member".to_string()))?;

        let links = pages
            .0
            .into_iter()
            .filter_map(|(_page_id, page)| page.langlinks)
            .flatten()
            .map(|raw| LangLink {
                language: raw.langname,
                term: raw.title,
                url: raw.url,
            })
            .collect();

        Ok(LangLinksPage {
            links,
            continuation: body.continuation.filter(|token| !token.is_empty()),
        })
    }

    /// Parse a prefix-search response. MediaWiki omits `query` entirely when
    /// nothing matches, which is reported as an empty list.
    pub fn parse_page_titles(&self, response: HttpResponse) -> Result<Vec<PageTitle>, ApiError> {
        let body: QueryResponse<TitleEntry> = decode(&response)?;
        let Some(query) = body.query else {
            return Ok(Vec::new());
        };
        let pages: Pages<TitleEntry> = query
            .pages
            .ok_or_else(|| ApiError::MalformedResponse("missing `query.pages` member".to_string()))?;

        Ok(pages
            .0
            .into_iter()
            .filter_map(|(_page_id, page)| {
                let title = page.title.filter(|t| !t.is_empty())?;
                Some(PageTitle {
                    title,
                    display_title: page.pageprops.and_then(|p| p.displaytitle),
                })
            })
            .collect())
    }

    fn get(&self, query: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}?{query}", self.config.endpoint()),
            headers: vec![("user-agent".to_string(), USER_AGENT.to_string())],
        }
    }
}

/// `key=value` pairs of the token joined by `&`, or `continue=` when empty.
pub fn continuation_segment(continuation: &ContinuationToken) -> String {
    if continuation.is_empty() {
        return "continue=".to_string();
    }
    continuation
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Status check, JSON decode and error-envelope detection shared by both
/// response shapes.
fn decode<P: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<QueryResponse<P>, ApiError> {
    check_status(response, 200)?;
    let mut body: QueryResponse<P> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    if let Some(error) = body.error.take() {
        return Err(ApiError::Api {
            code: error.code,
            info: error.info,
        });
    }
    if let Some(warnings) = &body.warnings {
        tracing::warn!(%warnings, "MediaWiki returned warnings");
    }
    Ok(body)
}

/// Map non-success status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
