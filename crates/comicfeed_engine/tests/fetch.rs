use std::time::Duration;

use comicfeed_engine::{
    ChapterStatus, FailureKind, FetchSettings, HttpPageFetcher, PageFetcher,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> HttpPageFetcher {
    HttpPageFetcher::new(server.uri(), FetchSettings::default())
}

#[tokio::test]
async fn page_fetch_decodes_listing_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokens"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data":{"results":[{"_id":"tok-a"},{"token_id":"tok-b","status":"read"}],"has_more":true}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let batch = fetcher(&server)
        .fetch_page("tokens", 1, 20)
        .await
        .expect("page fetch ok");

    assert!(batch.has_more);
    let ids: Vec<_> = batch.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["tok-a", "tok-b"]);
    assert_eq!(batch.items[0].status, None);
    assert_eq!(batch.items[1].status.as_deref(), Some("read"));
}

#[tokio::test]
async fn missing_has_more_defaults_to_terminal_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/publications"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data":{"results":[{"_id":"pub-1"}]}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let batch = fetcher(&server)
        .fetch_page("publications", 1, 20)
        .await
        .expect("page fetch ok");
    assert!(!batch.has_more);
    assert_eq!(batch.items.len(), 1);
}

#[tokio::test]
async fn gated_statuses_map_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokens"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_page("tokens", 1, 20).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Unauthorized);
}

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_page("nope", 1, 20).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokens"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = HttpPageFetcher::new(server.uri(), settings);
    let err = fetcher.fetch_page("tokens", 1, 20).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_page("tokens", 1, 20).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn chapter_lookahead_reports_next_chapter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chapters"))
        .and(query_param("comic_id", "comic-7"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data":{"results":[
                {"chapter_id":3,"status":"read","lang":{"en":2,"id":3}},
                {"chapter_id":4,"status":"paid","lang":{"en":5}}
            ]}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let lookahead = fetcher(&server)
        .fetch_chapter("comic-7", 3)
        .await
        .expect("chapter fetch ok");

    assert!(lookahead.has_next);
    let chapter = lookahead.chapter.expect("chapter present");
    assert_eq!(chapter.id, 3);
    assert_eq!(chapter.status, ChapterStatus::Read);
    assert!(chapter.status.is_unlocked());
    assert!(chapter.is_available());
    assert_eq!(chapter.page_count("en"), Some(2));
    assert_eq!(chapter.page_count("fr"), None);
}

#[tokio::test]
async fn unknown_status_deserializes_as_locked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chapters"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data":{"results":[{"chapter_id":9,"status":"preorder","lang":{}}]}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let lookahead = fetcher(&server)
        .fetch_chapter("comic-7", 9)
        .await
        .expect("chapter fetch ok");

    assert!(!lookahead.has_next);
    let chapter = lookahead.chapter.expect("chapter present");
    assert_eq!(chapter.status, ChapterStatus::Locked);
    // Empty lang map means nothing is published yet.
    assert!(!chapter.is_available());
}

#[tokio::test]
async fn absent_chapter_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chapters"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"data":{"results":[]}}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let lookahead = fetcher(&server)
        .fetch_chapter("comic-7", 99)
        .await
        .expect("chapter fetch ok");
    assert_eq!(lookahead.chapter, None);
    assert!(!lookahead.has_next);
}

#[test]
fn page_urls_enumerate_one_based_pages() {
    let urls = comicfeed_engine::chapter_page_urls("https://api.example.com/", "comic-7", 3, "en", 3);
    assert_eq!(
        urls,
        vec![
            "https://api.example.com/pages/comic-7/3/1/en",
            "https://api.example.com/pages/comic-7/3/2/en",
            "https://api.example.com/pages/comic-7/3/3/en",
        ]
    );
}
