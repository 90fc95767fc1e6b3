use comicfeed_engine::{
    FailureKind, FetchSettings, HttpImageLoader, ImageLoader, ImageOutcome, ImageSlot,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfakeimagebytes";

fn loader(cache: &tempfile::TempDir) -> HttpImageLoader {
    HttpImageLoader::new(FetchSettings::default(), cache.path().to_path_buf())
}

async fn mount_page(server: &MockServer, route: &str, body: &'static [u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "image/png"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn ready_handle_spools_bytes_and_releases_on_drop() {
    let server = MockServer::start().await;
    mount_page(&server, "/pages/c/1/1/en", PNG_BYTES).await;
    let cache = tempfile::TempDir::new().unwrap();

    let outcome = loader(&cache)
        .load_image(&format!("{}/pages/c/1/1/en", server.uri()))
        .await
        .expect("image load ok");

    let handle = match outcome {
        ImageOutcome::Ready(handle) => handle,
        other => panic!("expected ready handle, got {other:?}"),
    };
    assert_eq!(handle.byte_len(), PNG_BYTES.len() as u64);
    assert_eq!(handle.content_type(), Some("image/png"));
    let path = handle.path().to_path_buf();
    assert_eq!(std::fs::read(&path).unwrap(), PNG_BYTES);

    drop(handle);
    assert!(!path.exists());
}

#[tokio::test]
async fn gated_image_resolves_unauthorized_without_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/c/2/1/en"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_page(&server, "/pages/c/1/1/en", PNG_BYTES).await;
    let cache = tempfile::TempDir::new().unwrap();
    let loader = loader(&cache);

    // Locked page: explicit outcome, no error, nothing to display.
    let outcome = loader
        .load_image(&format!("{}/pages/c/2/1/en", server.uri()))
        .await
        .expect("gated load resolves");
    assert!(matches!(outcome, ImageOutcome::Unauthorized));

    // Switching to an unlocked URL afterwards reaches Ready.
    let outcome = loader
        .load_image(&format!("{}/pages/c/1/1/en", server.uri()))
        .await
        .expect("image load ok");
    assert!(matches!(outcome, ImageOutcome::Ready(_)));
}

#[tokio::test]
async fn missing_image_is_an_error() {
    let server = MockServer::start().await;
    let cache = tempfile::TempDir::new().unwrap();

    let err = loader(&cache)
        .load_image(&format!("{}/pages/c/1/9/en", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
}

#[tokio::test]
async fn oversize_image_is_rejected() {
    let server = MockServer::start().await;
    mount_page(&server, "/pages/c/1/1/en", PNG_BYTES).await;
    let cache = tempfile::TempDir::new().unwrap();

    let settings = FetchSettings {
        max_image_bytes: 4,
        ..FetchSettings::default()
    };
    let loader = HttpImageLoader::new(settings, cache.path().to_path_buf());
    let err = loader
        .load_image(&format!("{}/pages/c/1/1/en", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 4, .. }));
}

#[tokio::test]
async fn non_image_content_type_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/c/1/1/en"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>login</html>", "text/html"),
        )
        .mount(&server)
        .await;
    let cache = tempfile::TempDir::new().unwrap();

    let err = loader(&cache)
        .load_image(&format!("{}/pages/c/1/1/en", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "text/html".to_string()
        }
    );
}

#[tokio::test]
async fn slot_discards_stale_resolution_and_keeps_only_live_handle() {
    let server = MockServer::start().await;
    mount_page(&server, "/pages/c/1/1/en", PNG_BYTES).await;
    mount_page(&server, "/pages/c/1/2/en", PNG_BYTES).await;
    let cache = tempfile::TempDir::new().unwrap();
    let loader = loader(&cache);

    let url_a = format!("{}/pages/c/1/1/en", server.uri());
    let url_b = format!("{}/pages/c/1/2/en", server.uri());

    let mut slot = ImageSlot::new();
    let gen_a = slot.set_source(&url_a);
    // The source changes before A's fetch completes.
    let gen_b = slot.set_source(&url_b);
    assert!(slot.is_pending());
    assert_eq!(slot.source(), Some(url_b.as_str()));

    // A's fetch eventually resolves; it must not leave a live handle.
    let outcome_a = loader.load_image(&url_a).await.expect("load a");
    let path_a = match &outcome_a {
        ImageOutcome::Ready(handle) => handle.path().to_path_buf(),
        other => panic!("expected ready handle, got {other:?}"),
    };
    assert!(!slot.resolve(gen_a, outcome_a));
    assert!(slot.display_path().is_none());
    assert!(!path_a.exists());

    let outcome_b = loader.load_image(&url_b).await.expect("load b");
    assert!(slot.resolve(gen_b, outcome_b));
    let path_b = slot.display_path().expect("b displayable").to_path_buf();
    assert!(path_b.exists());

    // Teardown releases the remaining handle.
    drop(slot);
    assert!(!path_b.exists());
}

#[tokio::test]
async fn clearing_a_slot_releases_its_handle() {
    let server = MockServer::start().await;
    mount_page(&server, "/pages/c/1/1/en", PNG_BYTES).await;
    let cache = tempfile::TempDir::new().unwrap();
    let loader = loader(&cache);
    let url = format!("{}/pages/c/1/1/en", server.uri());

    let mut slot = ImageSlot::new();
    let generation = slot.set_source(&url);
    let outcome = loader.load_image(&url).await.expect("load ok");
    assert!(slot.resolve(generation, outcome));
    let path = slot.display_path().expect("displayable").to_path_buf();

    slot.clear();
    assert!(slot.is_pending());
    assert!(!path.exists());

    // A resolution arriving after teardown is also discarded.
    let late = loader.load_image(&url).await.expect("load ok");
    assert!(!slot.resolve(generation, late));
    assert!(slot.display_path().is_none());
}
