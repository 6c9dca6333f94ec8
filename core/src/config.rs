//! Client configuration.
//!
//! A `ClientConfig` is validated once and then frozen inside a `WikiClient`.
//! Switching language means building a new client; nothing mutates the host
//! of a client that may have requests in flight.

use crate::error::ApiError;

/// Default continuation safety bound.
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Default number of prefix-search suggestions (`gpslimit`).
pub const DEFAULT_AUTOCOMPLETE_LIMIT: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    language_code: String,
    endpoint: Option<String>,
    max_pages: usize,
    autocomplete_limit: u32,
}

impl ClientConfig {
    /// Configuration for `https://{language_code}.wikipedia.org/w/api.php`.
    ///
    /// Codes must be non-empty and consist of ASCII lowercase letters, digits
    /// and `-` (`en`, `zh-yue`, `be-x-old`).
    pub fn new(language_code: &str) -> Result<Self, ApiError> {
        let valid = !language_code.is_empty()
            && !language_code.starts_with('-')
            && !language_code.ends_with('-')
            && language_code
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(ApiError::InvalidLanguageCode(language_code.to_string()));
        }
        Ok(Self {
            language_code: language_code.to_string(),
            endpoint: None,
            max_pages: DEFAULT_MAX_PAGES,
            autocomplete_limit: DEFAULT_AUTOCOMPLETE_LIMIT,
        })
    }

    /// Send requests to `endpoint` (a full `api.php` URL) instead of the
    /// Wikipedia host derived from the language code.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.trim_end_matches('/').to_string());
        self
    }

    /// Maximum number of requests one langlinks search may issue. Values
    /// below 1 are raised to 1.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_autocomplete_limit(mut self, limit: u32) -> Self {
        self.autocomplete_limit = limit;
        self
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn autocomplete_limit(&self) -> u32 {
        self.autocomplete_limit
    }

    /// The `api.php` URL every request is sent to.
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.wikipedia.org/w/api.php", self.language_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_follows_language_code() {
        assert_eq!(
            ClientConfig::new("en").unwrap().endpoint(),
            "https://en.wikipedia.org/w/api.php"
        );
        assert_eq!(
            ClientConfig::new("de").unwrap().endpoint(),
            "https://de.wikipedia.org/w/api.php"
        );
    }

    #[test]
    fn accepts_hyphenated_codes() {
        let config = ClientConfig::new("be-x-old").unwrap();
        assert_eq!(config.endpoint(), "https://be-x-old.wikipedia.org/w/api.php");
    }

    #[test]
    fn rejects_codes_that_could_change_the_host() {
        for code in ["", "EN", "en.evil.com", "en/", "-en", "de-", "en wiki"] {
            let err = ClientConfig::new(code).unwrap_err();
            assert!(matches!(err, ApiError::InvalidLanguageCode(_)), "{code:?}");
        }
    }

    #[test]
    fn endpoint_override_strips_trailing_slash() {
        let config = ClientConfig::new("en")
            .unwrap()
            .with_endpoint("http://127.0.0.1:3000/w/api.php/");
        assert_eq!(config.endpoint(), "http://127.0.0.1:3000/w/api.php");
        assert_eq!(config.language_code(), "en");
    }

    #[test]
    fn defaults_and_bounds() {
        let config = ClientConfig::new("en").unwrap();
        assert_eq!(config.max_pages(), DEFAULT_MAX_PAGES);
        assert_eq!(config.autocomplete_limit(), DEFAULT_AUTOCOMPLETE_LIMIT);
        assert_eq!(config.with_max_pages(0).max_pages(), 1);
    }
}
