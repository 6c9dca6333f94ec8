//! Domain types for the langlinks and autocomplete queries.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// One cross-language equivalent of the searched page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LangLink {
    /// Human-readable language name (`langname`), e.g. "German".
    pub language: String,
    /// Title of the linked page in that language.
    pub term: String,
    pub url: String,
}

/// One autocomplete candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageTitle {
    pub title: String,
    /// `pageprops.displaytitle`, present when the page overrides how its
    /// title is rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
}

/// Opaque continuation marker returned in a response's `continue` member.
///
/// Pairs keep the order the API sent them in and are forwarded unmodified on
/// the next request. Numeric values are kept as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationToken(Vec<(String, String)>);

impl ContinuationToken {
    /// The token of a first request.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContinuationToken {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for ContinuationToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TokenVisitor;

        impl<'de> Visitor<'de> for TokenVisitor {
            type Value = ContinuationToken;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of string or number continuation values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(2));
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Number(n) => n.to_string(),
                        other => {
                            return Err(de::Error::custom(format!(
                                "continuation value for {key:?} is not a string or number: {other}"
                            )))
                        }
                    };
                    pairs.push((key, value));
                }
                Ok(ContinuationToken(pairs))
            }
        }

        deserializer.deserialize_map(TokenVisitor)
    }
}

/// The parsed content of one langlinks response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangLinksPage {
    pub links: Vec<LangLink>,
    /// `None` when the response carried no (or an empty) `continue` member.
    pub continuation: Option<ContinuationToken>,
}

/// One event of a logical langlinks search.
///
/// A search yields one `Batch` per response page, in continuation order, and
/// a single `Done` after the last batch. Each page's links appear in exactly
/// one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum SearchEvent {
    Batch(Vec<LangLink>),
    Done,
}
