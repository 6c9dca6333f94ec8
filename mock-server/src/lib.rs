//! Stub of the MediaWiki `api.php` endpoint.
//!
//! Serves the two query shapes the client uses, `prop=langlinks` with
//! `llcontinue` pagination and `generator=prefixsearch`, from an in-memory
//! fixture. Link pagination mirrors MediaWiki: links are ordered by
//! (page id, language code), at most `lllimit` are returned per response, and
//! the next position is reported as `{"llcontinue": "<pageid>|<lang>",
//! "continue": "||"}`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// MediaWiki's default `lllimit`.
pub const DEFAULT_LANGLINKS_LIMIT: usize = 10;

/// MediaWiki's default `gpslimit`.
pub const DEFAULT_PREFIXSEARCH_LIMIT: usize = 10;

#[derive(Clone, Debug)]
pub struct FixtureLangLink {
    pub lang: String,
    pub langname: String,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct FixturePage {
    pub id: u64,
    pub title: String,
    pub display_title: Option<String>,
    pub langlinks: Vec<FixtureLangLink>,
}

/// The content a stub wiki serves.
#[derive(Clone, Debug)]
pub struct Wiki {
    pub pages: Vec<FixturePage>,
    pub langlinks_limit: usize,
}

pub type WikiState = Arc<Wiki>;

impl Wiki {
    pub fn new(pages: Vec<FixturePage>) -> Self {
        Self {
            pages,
            langlinks_limit: DEFAULT_LANGLINKS_LIMIT,
        }
    }

    /// Default number of links per response when the request has no `lllimit`.
    pub fn with_langlinks_limit(mut self, limit: usize) -> Self {
        self.langlinks_limit = limit.max(1);
        self
    }

    /// A small English wiki. "Germany" has more links than one default page
    /// holds, so looking it up takes a continuation round-trip.
    pub fn sample() -> Self {
        let germany = [
            ("ar", "Arabic", "ألمانيا"),
            ("de", "German", "Deutschland"),
            ("es", "Spanish", "Alemania"),
            ("fi", "Finnish", "Saksa"),
            ("fr", "French", "Allemagne"),
            ("it", "Italian", "Germania"),
            ("ja", "Japanese", "ドイツ"),
            ("nl", "Dutch", "Duitsland"),
            ("pl", "Polish", "Niemcy"),
            ("pt", "Portuguese", "Alemanha"),
            ("ru", "Russian", "Германия"),
            ("sv", "Swedish", "Tyskland"),
        ];
        let berlin = [("de", "German", "Berlin"), ("fr", "French", "Berlin"), ("pl", "Polish", "Berlin")];
        let rust = [
            ("de", "German", "Rust (Programmiersprache)"),
            ("ja", "Japanese", "Rust (プログラミング言語)"),
        ];

        Self::new(vec![
            page(11867, "Germany", None, &germany),
            page(3354, "Berlin", None, &berlin),
            page(29414838, "Rust (programming language)", None, &rust),
            page(8841749, "IPhone", Some("iPhone"), &[]),
            page(4068, "Gerald Ford", None, &[]),
            page(19143, "German language", None, &[]),
        ])
    }

    fn find(&self, title: &str) -> Option<&FixturePage> {
        self.pages.iter().find(|p| p.title == title)
    }
}

fn page(id: u64, title: &str, display_title: Option<&str>, links: &[(&str, &str, &str)]) -> FixturePage {
    FixturePage {
        id,
        title: title.to_string(),
        display_title: display_title.map(str::to_string),
        langlinks: links
            .iter()
            .map(|(lang, langname, title)| FixtureLangLink {
                lang: lang.to_string(),
                langname: langname.to_string(),
                title: title.to_string(),
            })
            .collect(),
    }
}

pub fn app() -> Router {
    app_with(Wiki::sample())
}

pub fn app_with(wiki: Wiki) -> Router {
    let state: WikiState = Arc::new(wiki);
    Router::new().route("/w/api.php", get(api)).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, wiki: Wiki) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(wiki)).await
}

/// Build the public URL of a page on the `lang` edition.
pub fn article_url(lang: &str, title: &str) -> String {
    format!("https://{lang}.wikipedia.org/wiki/{}", title.replace(' ', "_"))
}

async fn api(State(wiki): State<WikiState>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    tracing::debug!(?params, "api.php request");
    let param = |name: &str| params.get(name).map(String::as_str);

    if param("action") != Some("query") {
        return Json(api_error("badvalue", "Unrecognized value for parameter \"action\"."));
    }
    if param("format") != Some("json") {
        return Json(api_error("badvalue", "Only format=json is supported."));
    }

    let mut body = match (param("prop"), param("generator")) {
        (_, Some("prefixsearch")) => prefixsearch(&wiki, &params),
        (Some("langlinks"), None) => langlinks(&wiki, &params),
        _ => api_error("badparams", "Unsupported query."),
    };

    // MediaWiki nags first langlinks requests that do not opt into `continue=`.
    if param("prop") == Some("langlinks") && !params.contains_key("continue") && body.get("error").is_none() {
        body["warnings"] = json!({"main": {"*": "Subscribe to the mediawiki-api-announce mailing list."}});
    }
    Json(body)
}

fn api_error(code: &str, info: &str) -> Value {
    json!({"error": {"code": code, "info": info}, "servedby": "mock-server"})
}

fn langlinks(wiki: &Wiki, params: &HashMap<String, String>) -> Value {
    let Some(titles) = params.get("titles").filter(|t| !t.is_empty()) else {
        return api_error("missingparam", "The \"titles\" parameter must be set.");
    };
    let limit = match params.get("lllimit") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return api_error("badinteger", "Invalid value for \"lllimit\"."),
        },
        None => wiki.langlinks_limit,
    };
    let start = match params.get("llcontinue") {
        Some(raw) => match raw.split_once('|').and_then(|(id, lang)| Some((id.parse::<u64>().ok()?, lang))) {
            Some((id, lang)) => Some((id, lang.to_string())),
            None => return api_error("badcontinue", "Invalid continue param."),
        },
        None => None,
    };
    let props: Vec<&str> = params.get("llprop").map(|p| p.split('|').collect()).unwrap_or_default();

    let mut found: Vec<&FixturePage> = Vec::new();
    let mut pages = Map::new();
    let mut missing = 0i64;
    for title in titles.split('|') {
        match wiki.find(title) {
            Some(page) => {
                found.push(page);
                pages.insert(page.id.to_string(), json!({"pageid": page.id, "ns": 0, "title": page.title}));
            }
            None => {
                missing -= 1;
                pages.insert(missing.to_string(), json!({"ns": 0, "title": title, "missing": ""}));
            }
        }
    }

    found.sort_by_key(|p| p.id);
    let mut ordered: Vec<(u64, &FixtureLangLink)> = Vec::new();
    for page in found {
        let mut links: Vec<&FixtureLangLink> = page.langlinks.iter().collect();
        links.sort_by(|a, b| a.lang.cmp(&b.lang));
        ordered.extend(links.into_iter().map(|l| (page.id, l)));
    }
    let remaining: Vec<(u64, &FixtureLangLink)> = ordered
        .into_iter()
        .filter(|(id, link)| match &start {
            Some((start_id, start_lang)) => (*id, link.lang.as_str()) >= (*start_id, start_lang.as_str()),
            None => true,
        })
        .collect();

    for (id, link) in remaining.iter().take(limit) {
        let mut entry = json!({"lang": link.lang, "*": link.title});
        if props.contains(&"url") {
            entry["url"] = json!(article_url(&link.lang, &link.title));
        }
        if props.contains(&"langname") {
            entry["langname"] = json!(link.langname);
        }
        if let Some(Value::Object(page)) = pages.get_mut(&id.to_string()) {
            if let Value::Array(links) = page.entry("langlinks").or_insert_with(|| Value::Array(Vec::new())) {
                links.push(entry);
            }
        }
    }

    let mut body = json!({"query": {"pages": pages}});
    match remaining.get(limit) {
        Some((id, next)) => {
            body["continue"] = json!({"llcontinue": format!("{id}|{}", next.lang), "continue": "||"});
        }
        None => body["batchcomplete"] = json!(""),
    }
    body
}

fn prefixsearch(wiki: &Wiki, params: &HashMap<String, String>) -> Value {
    let Some(search) = params.get("gpssearch") else {
        return api_error("missingparam", "The \"gpssearch\" parameter must be set.");
    };
    let limit = params
        .get("gpslimit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_PREFIXSEARCH_LIMIT);
    let want_display_title = params.get("prop").map(String::as_str) == Some("pageprops")
        && params.get("ppprop").is_some_and(|p| p.split('|').any(|p| p == "displaytitle"));

    let needle = search.to_lowercase();
    let matches: Vec<&FixturePage> = wiki
        .pages
        .iter()
        .filter(|p| !needle.is_empty() && p.title.to_lowercase().starts_with(&needle))
        .collect();
    if matches.is_empty() {
        return json!({"batchcomplete": ""});
    }

    let mut pages = Map::new();
    for (index, page) in matches.iter().take(limit).enumerate() {
        let mut entry = json!({"pageid": page.id, "ns": 0, "title": page.title, "index": index + 1});
        if let (true, Some(display)) = (want_display_title, &page.display_title) {
            entry["pageprops"] = json!({"displaytitle": display});
        }
        pages.insert(page.id.to_string(), entry);
    }

    let mut body = json!({"query": {"pages": pages}});
    if matches.len() > limit {
        body["continue"] = json!({"gpsoffset": limit, "continue": "gpsoffset||"});
    } else {
        body["batchcomplete"] = json!("");
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn article_url_uses_underscores() {
        assert_eq!(
            article_url("de", "Rust (Programmiersprache)"),
            "https://de.wikipedia.org/wiki/Rust_(Programmiersprache)"
        );
    }

    #[test]
    fn langlinks_first_page_respects_limit() {
        let body = langlinks(&Wiki::sample(), &params(&[("titles", "Germany"), ("llprop", "langname|url")]));
        let links = body["query"]["pages"]["11867"]["langlinks"].as_array().unwrap();
        assert_eq!(links.len(), DEFAULT_LANGLINKS_LIMIT);
        assert_eq!(links[0]["lang"], "ar");
        assert_eq!(links[0]["langname"], "Arabic");
        assert_eq!(body["continue"]["llcontinue"], "11867|ru");
        assert_eq!(body["continue"]["continue"], "||");
    }

    #[test]
    fn langlinks_resumes_from_continue() {
        let body = langlinks(
            &Wiki::sample(),
            &params(&[("titles", "Germany"), ("llprop", "langname|url"), ("llcontinue", "11867|ru")]),
        );
        let links = body["query"]["pages"]["11867"]["langlinks"].as_array().unwrap();
        let langs: Vec<_> = links.iter().map(|l| l["lang"].as_str().unwrap()).collect();
        assert_eq!(langs, vec!["ru", "sv"]);
        assert!(body.get("continue").is_none());
        assert_eq!(body["batchcomplete"], "");
    }

    #[test]
    fn langlinks_omits_unrequested_props() {
        let body = langlinks(&Wiki::sample(), &params(&[("titles", "Berlin")]));
        let link = &body["query"]["pages"]["3354"]["langlinks"][0];
        assert!(link.get("url").is_none());
        assert!(link.get("langname").is_none());
        assert_eq!(link["*"], "Berlin");
    }

    #[test]
    fn langlinks_reports_missing_titles() {
        let body = langlinks(&Wiki::sample(), &params(&[("titles", "Atlantis")]));
        assert_eq!(body["query"]["pages"]["-1"]["missing"], "");
        assert!(body["query"]["pages"]["-1"].get("langlinks").is_none());
    }

    #[test]
    fn langlinks_rejects_bad_continue() {
        let body = langlinks(&Wiki::sample(), &params(&[("titles", "Germany"), ("llcontinue", "nope")]));
        assert_eq!(body["error"]["code"], "badcontinue");
    }

    #[test]
    fn prefixsearch_without_matches_has_no_query() {
        let body = prefixsearch(&Wiki::sample(), &params(&[("gpssearch", "Zzz")]));
        assert_eq!(body, json!({"batchcomplete": ""}));
    }

    #[test]
    fn prefixsearch_adds_display_title_when_requested() {
        let body = prefixsearch(
            &Wiki::sample(),
            &params(&[("gpssearch", "iph"), ("prop", "pageprops"), ("ppprop", "displaytitle")]),
        );
        assert_eq!(body["query"]["pages"]["8841749"]["pageprops"]["displaytitle"], "iPhone");
    }
}
