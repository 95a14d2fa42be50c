use std::path::PathBuf;
use std::time::Duration;

use hostpress_core::{ErrorKind, HostpressError};
use hostpress_ingest::scraper::{cache_key, CachedPage};
use hostpress_ingest::{CompletionClient, OpenAiClient, Scraper};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "<html><head><title>Toys</title></head><body><p>Stacking   cups</p><style>p{}</style></body></html>";

fn temp_cache() -> PathBuf {
    std::env::temp_dir().join(format!("hostpress-scrape-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn scrape_is_cached_on_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = temp_cache();
    let scraper = Scraper::new(&dir, Duration::from_secs(3600)).unwrap();
    let url = format!("{}/page", server.uri());

    assert_eq!(scraper.scrape(&url).await, "Stacking cups");
    assert_eq!(scraper.scrape(&url).await, "Stacking cups");

    let raw = std::fs::read_to_string(dir.join(format!("{}.json", cache_key(&url)))).unwrap();
    let cached: CachedPage = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached.title, "Toys");
    assert_eq!(cached.content, "Stacking cups");
    assert!(cached.timestamp > 0);
}

#[tokio::test]
async fn stale_cache_entries_are_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = temp_cache();
    let url = format!("{}/page", server.uri());
    std::fs::create_dir_all(&dir).unwrap();
    let stale = CachedPage {
        title: url.clone(),
        content: "old".into(),
        timestamp: 0,
    };
    std::fs::write(
        dir.join(format!("{}.json", cache_key(&url))),
        serde_json::to_vec(&stale).unwrap(),
    )
    .unwrap();

    let scraper = Scraper::new(&dir, Duration::from_secs(86_400)).unwrap();
    assert_eq!(scraper.scrape(&url).await, "Stacking cups");
}

#[tokio::test]
async fn failed_fetch_is_empty_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let dir = temp_cache();
    let scraper = Scraper::new(&dir, Duration::from_secs(3600)).unwrap();
    let url = format!("{}/missing", server.uri());

    assert_eq!(scraper.scrape(&url).await, "");
    assert_eq!(scraper.scrape(&url).await, "");
    assert!(!dir.join(format!("{}.json", cache_key(&url))).exists());
}

#[tokio::test]
async fn completion_sends_model_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini-2024-07-18",
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "<h1>Hi</h1>"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(
        format!("{}/v1/", server.uri()),
        "test-key",
        "gpt-4o-mini-2024-07-18",
    )
    .unwrap();
    assert_eq!(client.complete("sys", "hello").await.unwrap(), "<h1>Hi</h1>");
}

#[tokio::test]
async fn completion_failures_are_upstream_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(server.uri(), "k", "m").unwrap();
    let err = client.complete("sys", "hello").await.unwrap_err();
    assert_eq!(HostpressError::kind_of(&err), Some(ErrorKind::Upstream));
    let hp = HostpressError::find(&err).unwrap();
    assert!(hp.details.as_deref().unwrap_or_default().contains("slow down"));
}

#[tokio::test]
async fn empty_choices_yield_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(server.uri(), "k", "m").unwrap();
    assert_eq!(client.complete("sys", "hello").await.unwrap(), "");
}
