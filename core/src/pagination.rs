//! Continuation-pagination engine for langlinks searches.
//!
//! # Design
//! A `LangLinkSearch` is an I/O-free state machine for one logical search.
//! The host loops on `next_request` / `handle_response` and forwards the
//! events it gets back:
//!
//! ```text
//! Requesting(token) --response with `continue`-->    Requesting(next token)
//! Requesting(token) --response without `continue`--> Finished   (Batch, Done)
//! Requesting(token) --error-->                       Failed     (no Done)
//! ```
//!
//! Every page's links are delivered exactly once, in their own `Batch`, as
//! soon as that page is parsed. Concatenating all batches gives the complete
//! result. `Done` is emitted once, after the last page's batch.
//!
//! The upstream API can in principle return a continuation chain that never
//! ends. The search refuses to issue more than `ClientConfig::max_pages`
//! requests and fails with `ApiError::PageLimitExceeded` instead.

use crate::client::WikiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{ContinuationToken, LangLink, SearchEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchState {
    Requesting(ContinuationToken),
    Finished,
    Failed,
}

/// One logical langlinks search, possibly spanning several requests.
#[derive(Debug, Clone)]
pub struct LangLinkSearch {
    client: WikiClient,
    term: String,
    state: SearchState,
    pages_fetched: usize,
}

impl LangLinkSearch {
    pub fn new(client: WikiClient, term: &str) -> Self {
        Self {
            client,
            term: term.to_string(),
            state: SearchState::Requesting(ContinuationToken::empty()),
            pages_fetched: 0,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Number of responses parsed so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// `true` once `Done` has been emitted or the search has failed.
    pub fn is_finished(&self) -> bool {
        !matches!(self.state, SearchState::Requesting(_))
    }

    /// The request for the next page, or `None` when the search is over.
    ///
    /// Fails with `PageLimitExceeded` when issuing the request would exceed
    /// the configured page bound; the search is then over.
    pub fn next_request(&mut self) -> Result<Option<HttpRequest>, ApiError> {
        if self.is_finished() {
            return Ok(None);
        }
        let limit = self.client.config().max_pages();
        if self.pages_fetched >= limit {
            tracing::warn!(term = %self.term, limit, "continuation chain exceeded page limit");
            self.state = SearchState::Failed;
            return Err(ApiError::PageLimitExceeded { limit });
        }
        let SearchState::Requesting(token) = &self.state else {
            return Ok(None);
        };
        tracing::debug!(term = %self.term, page = self.pages_fetched + 1, "requesting langlinks page");
        Ok(Some(self.client.build_langlinks(&self.term, token)))
    }

    /// Parse the response to the last request and advance the state machine.
    ///
    /// Returns `[Batch]` while more pages remain and `[Batch, Done]` for the
    /// final page. A response arriving after the search is over yields no
    /// events.
    pub fn handle_response(&mut self, response: HttpResponse) -> Result<Vec<SearchEvent>, ApiError> {
        if self.is_finished() {
            tracing::warn!(term = %self.term, "ignoring response for a finished search");
            return Ok(Vec::new());
        }

        let page = match self.client.parse_langlinks(response) {
            Ok(page) => page,
            Err(e) => {
                self.state = SearchState::Failed;
                return Err(e);
            }
        };
        self.pages_fetched += 1;
        tracing::debug!(
            term = %self.term,
            page = self.pages_fetched,
            links = page.links.len(),
            more = page.continuation.is_some(),
            "parsed langlinks page"
        );

        let mut events = vec![SearchEvent::Batch(page.links)];
        match page.continuation {
            Some(token) => self.state = SearchState::Requesting(token),
            None => {
                self.state = SearchState::Finished;
                tracing::info!(term = %self.term, pages = self.pages_fetched, "langlinks search complete");
                events.push(SearchEvent::Done);
            }
        }
        Ok(events)
    }

    /// Record that the host could not complete the last request. No further
    /// requests or events follow.
    pub fn fail(&mut self) {
        self.state = SearchState::Failed;
    }
}

/// Run a whole search over a blocking transport and return every link.
///
/// `execute` performs one HTTP round-trip; its errors end the search.
pub fn drive_langlinks<F>(mut search: LangLinkSearch, mut execute: F) -> Result<Vec<LangLink>, ApiError>
where
    F: FnMut(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    let mut accumulated = Vec::new();
    while let Some(request) = search.next_request()? {
        let response = match execute(request) {
            Ok(response) => response,
            Err(e) => {
                search.fail();
                return Err(e);
            }
        };
        for event in search.handle_response(response)? {
            if let SearchEvent::Batch(links) = event {
                accumulated.extend(links);
            }
        }
    }
    Ok(accumulated)
}
