//! Async MediaWiki langlinks client.
//!
//! Executes the requests built by `wiki-core` with `reqwest` and exposes a
//! logical langlinks search as a stream of tagged events.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use wiki_client::{SearchEvent, WikiApi};
//!
//! let api = WikiApi::for_language("en")?;
//! let events = api.fetch_langlinks("Germany");
//! futures::pin_mut!(events);
//! while let Some(event) = events.next().await {
//!     match event? {
//!         SearchEvent::Batch(links) => links.iter().for_each(|l| println!("{}: {}", l.language, l.term)),
//!         SearchEvent::Done => println!("done"),
//!     }
//! }
//! ```

pub mod generation;

use std::collections::VecDeque;
use std::time::Duration;

use futures::{stream, Stream, StreamExt};

pub use generation::{RequestGeneration, Ticket};
pub use wiki_core::{
    ApiError, ClientConfig, HttpMethod, HttpRequest, HttpResponse, LangLink, LangLinkSearch, PageTitle,
    SearchEvent, WikiClient,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Async client bound to one language edition.
///
/// Cloning is cheap; clones share the connection pool. A different language
/// needs a new `WikiApi`.
#[derive(Debug, Clone)]
pub struct WikiApi {
    core: WikiClient,
    http: reqwest::Client,
}

impl WikiApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn for_language(language_code: &str) -> Result<Self, ApiError> {
        Self::new(ClientConfig::new(language_code)?)
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom timeouts).
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            core: WikiClient::new(config),
            http,
        }
    }

    pub fn core(&self) -> &WikiClient {
        &self.core
    }

    pub fn language_code(&self) -> &str {
        self.core.config().language_code()
    }

    /// Perform one HTTP round-trip. Any status is returned as data; only
    /// transport failures are errors here.
    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = match req.method {
            HttpMethod::Get => self.http.get(&req.url),
        };
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(url = %req.url, status, bytes = body.len(), "api.php response");
        Ok(HttpResponse { status, headers, body })
    }

    /// Search for the langlinks of `term`, following continuations.
    ///
    /// Yields one `Batch` per response page in continuation order and a
    /// final `Done`. Pages are requested one after another, each only after
    /// the previous one has been parsed. An `Err` item ends the stream; no
    /// `Done` follows it.
    pub fn fetch_langlinks(&self, term: &str) -> impl Stream<Item = Result<SearchEvent, ApiError>> + '_ {
        let search = self.core.langlinks_search(term);
        stream::unfold(Some((search, VecDeque::new())), move |state| async move {
            let (mut search, mut pending): (LangLinkSearch, VecDeque<SearchEvent>) = state?;
            loop {
                if let Some(event) = pending.pop_front() {
                    return Some((Ok(event), Some((search, pending))));
                }
                let request = match search.next_request() {
                    Ok(Some(request)) => request,
                    Ok(None) => return None,
                    Err(e) => return Some((Err(e), None)),
                };
                let response = match self.execute(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::warn!(term = %search.term(), error = %e, "langlinks request failed");
                        search.fail();
                        return Some((Err(e), None));
                    }
                };
                match search.handle_response(response) {
                    Ok(events) => pending.extend(events),
                    Err(e) => return Some((Err(e), None)),
                }
            }
        })
    }

    /// Run a whole langlinks search and return every link in delivery order.
    pub async fn collect_langlinks(&self, term: &str) -> Result<Vec<LangLink>, ApiError> {
        let events = self.fetch_langlinks(term);
        futures::pin_mut!(events);

        let mut links = Vec::new();
        while let Some(event) = events.next().await {
            if let SearchEvent::Batch(batch) = event? {
                links.extend(batch);
            }
        }
        Ok(links)
    }

    /// Prefix-search page titles. One request, no pagination, no debounce.
    pub async fn autocomplete(&self, term: &str) -> Result<Vec<PageTitle>, ApiError> {
        let response = self.execute(self.core.build_autocomplete(term)).await?;
        let titles = self.core.parse_page_titles(response)?;
        tracing::debug!(term, count = titles.len(), "autocomplete");
        Ok(titles)
    }

    /// `autocomplete` for keystroke-driven callers: takes a ticket from
    /// `generation` before the request and returns `Ok(None)` if a newer
    /// call started before this one's response arrived.
    pub async fn autocomplete_latest(
        &self,
        term: &str,
        generation: &RequestGeneration,
    ) -> Result<Option<Vec<PageTitle>>, ApiError> {
        let ticket = generation.next();
        let titles = self.autocomplete(term).await?;
        if !generation.is_current(ticket) {
            tracing::debug!(term, "discarding stale autocomplete response");
            return Ok(None);
        }
        Ok(Some(titles))
    }
}
