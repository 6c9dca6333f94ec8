//! Async client against the mock server over real HTTP.

use std::net::SocketAddr;

use futures::StreamExt;
use mock_server::{FixtureLangLink, FixturePage, Wiki};
use wiki_client::{ApiError, ClientConfig, LangLink, RequestGeneration, SearchEvent, WikiApi};

/// Serve `wiki` on a random port of the current runtime.
async fn start(wiki: Wiki) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with(listener, wiki));
    addr
}

fn api(lang: &str, addr: SocketAddr) -> WikiApi {
    let config = ClientConfig::new(lang)
        .unwrap()
        .with_endpoint(&format!("http://{addr}/w/api.php"));
    WikiApi::new(config).unwrap()
}

async fn events(api: &WikiApi, term: &str) -> Vec<Result<SearchEvent, ApiError>> {
    api.fetch_langlinks(term).collect().await
}

fn single_link_wiki(title: &str, lang: &str, langname: &str, term: &str) -> Wiki {
    Wiki::new(vec![FixturePage {
        id: 1,
        title: title.to_string(),
        display_title: None,
        langlinks: vec![FixtureLangLink {
            lang: lang.to_string(),
            langname: langname.to_string(),
            title: term.to_string(),
        }],
    }])
}

#[tokio::test]
async fn germany_single_page_example() {
    let addr = start(single_link_wiki("Germany", "de", "German", "Deutschland")).await;
    let events: Vec<SearchEvent> = events(&api("en", addr), "Germany")
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(
        events,
        vec![
            SearchEvent::Batch(vec![LangLink {
                language: "German".to_string(),
                term: "Deutschland".to_string(),
                url: "https://de.wikipedia.org/wiki/Deutschland".to_string(),
            }]),
            SearchEvent::Done,
        ]
    );
}

#[tokio::test]
async fn stream_yields_one_batch_per_page_then_done() {
    let addr = start(Wiki::sample()).await;
    let events: Vec<SearchEvent> = events(&api("en", addr), "Germany")
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], SearchEvent::Batch(links) if links.len() == 10));
    assert!(matches!(&events[1], SearchEvent::Batch(links) if links.len() == 2));
    assert_eq!(events[2], SearchEvent::Done);
}

#[tokio::test]
async fn collected_links_cover_the_whole_chain_in_order() {
    let addr = start(Wiki::sample().with_langlinks_limit(3)).await;
    let links = api("en", addr).collect_langlinks("Germany").await.unwrap();

    let languages: Vec<_> = links.iter().map(|l| l.language.as_str()).collect();
    assert_eq!(
        languages,
        vec![
            "Arabic", "German", "Spanish", "Finnish", "French", "Italian", "Japanese", "Dutch", "Polish",
            "Portuguese", "Russian", "Swedish",
        ]
    );
}

#[tokio::test]
async fn concurrent_clients_keep_their_own_language() {
    let en = start(single_link_wiki("Berlin", "de", "German", "Berlin")).await;
    let de = start(single_link_wiki("Berlin", "en", "Englisch", "Berlin")).await;
    let en_api = api("en", en);
    let de_api = api("de", de);

    let (en_links, de_links) = tokio::join!(en_api.collect_langlinks("Berlin"), de_api.collect_langlinks("Berlin"));

    assert_eq!(en_api.language_code(), "en");
    assert_eq!(de_api.language_code(), "de");
    assert_eq!(en_links.unwrap()[0].language, "German");
    assert_eq!(de_links.unwrap()[0].language, "Englisch");
}

#[tokio::test]
async fn page_limit_ends_stream_with_error() {
    let addr = start(Wiki::sample().with_langlinks_limit(1)).await;
    let config = ClientConfig::new("en")
        .unwrap()
        .with_endpoint(&format!("http://{addr}/w/api.php"))
        .with_max_pages(2);
    let events = events(&WikiApi::new(config).unwrap(), "Germany").await;

    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], Ok(SearchEvent::Batch(_))));
    assert!(matches!(events[1], Ok(SearchEvent::Batch(_))));
    assert!(matches!(events[2], Err(ApiError::PageLimitExceeded { limit: 2 })));
}

#[tokio::test]
async fn http_error_ends_stream_without_done() {
    let addr = start(Wiki::sample()).await;
    let config = ClientConfig::new("en")
        .unwrap()
        .with_endpoint(&format!("http://{addr}/nowhere.php"));
    let events = events(&WikiApi::new(config).unwrap(), "Germany").await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(ApiError::HttpError { status: 404, .. })));
}

#[tokio::test]
async fn unreachable_server_is_request_failed() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let events = events(&api("en", addr), "Germany").await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(ApiError::RequestFailed(_))));
}

#[tokio::test]
async fn autocomplete_returns_titles() {
    let addr = start(Wiki::sample()).await;
    let api = api("en", addr);

    let mut titles: Vec<_> = api
        .autocomplete("Ger")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Gerald Ford", "German language", "Germany"]);

    assert!(api.autocomplete("Xylophone").await.unwrap().is_empty());
}

#[tokio::test]
async fn stale_autocomplete_response_is_discarded() {
    let addr = start(Wiki::sample()).await;
    let api = api("en", addr);
    let generation = RequestGeneration::new();

    let (older, newer) = tokio::join!(
        api.autocomplete_latest("Ge", &generation),
        api.autocomplete_latest("Germ", &generation)
    );

    assert!(older.unwrap().is_none());
    let newer = newer.unwrap().unwrap();
    assert_eq!(newer.len(), 2);
}
