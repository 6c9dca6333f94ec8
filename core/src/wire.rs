//! Raw MediaWiki response shapes (`format=json`, `formatversion=1`).
//!
//! Only the members this crate reads are modelled; everything else in the
//! body is ignored. `pages` is kept in body order, never sorted.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::types::ContinuationToken;

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "P: DeserializeOwned"))]
pub(crate) struct QueryResponse<P> {
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub warnings: Option<serde_json::Value>,
    #[serde(default, rename = "continue")]
    pub continuation: Option<ContinuationToken>,
    #[serde(default)]
    pub query: Option<Query<P>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "P: DeserializeOwned"))]
pub(crate) struct Query<P> {
    #[serde(default)]
    pub pages: Option<Pages<P>>,
}

/// The `pages` member: an object keyed by page id, or an array under
/// `formatversion=2`. Entries keep their order of appearance.
#[derive(Debug)]
pub(crate) struct Pages<P>(pub Vec<(String, P)>);

impl<'de, P: DeserializeOwned> Deserialize<'de> for Pages<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PagesVisitor<P>(PhantomData<P>);

        impl<'de, P: DeserializeOwned> Visitor<'de> for PagesVisitor<P> {
            type Value = Pages<P>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map or list of pages")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(1));
                while let Some((id, page)) = map.next_entry::<String, P>()? {
                    entries.push((id, page));
                }
                Ok(Pages(entries))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(1));
                while let Some(page) = seq.next_element::<P>()? {
                    entries.push((entries.len().to_string(), page));
                }
                Ok(Pages(entries))
            }
        }

        deserializer.deserialize_any(PagesVisitor(PhantomData))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LangLinksEntry {
    #[serde(default)]
    pub langlinks: Option<Vec<RawLangLink>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLangLink {
    pub langname: String,
    pub url: String,
    #[serde(rename = "*")]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TitleEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageProps {
    #[serde(default)]
    pub displaytitle: Option<String>,
}
