//! Fetching live search pages, against a local `wiremock` server.

use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kroger_scraper::utils::http::create_client;
use kroger_scraper::{Config, HttpSource, KrogerScraper, ScrapeError};

const SEARCH_PAGE: &str = r#"<html><body><script>window.__INITIAL_STATE__ = JSON.parse('{"calypso":{"useCases":{"getProducts":{"search-grid":{"response":{"data":{"products":[{"id":"0001111041700","item":{"description":"Kroger 2% Milk","brand":{"name":"Kroger"},"images":[{"url":"https://img.example/milk.jpg"}],"shareLink":"https://www.kroger.com/p/milk"},"price":{"storePrices":{"regular":{"defaultDescription":"$2.79"}}}}]}}}}}}}')</script></body></html>"#;

fn config_for(server: &MockServer) -> Config {
    Config {
        search_url: format!("{}/search?query=QUERY", server.uri()),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

#[tokio::test]
async fn fetches_and_projects_search_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "2% milk"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = create_client(&config).unwrap();
    let source = HttpSource::for_query(client, &config, "2% milk").unwrap();

    let scraper = KrogerScraper::new(Arc::new(config));
    let records = scraper.scrape(&source).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some("0001111041700"));
    assert_eq!(records[0].name.as_deref(), Some("Kroger 2% Milk"));
    assert_eq!(records[0].price.as_deref(), Some("$2.79"));
    assert_eq!(records[0].description, None);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = create_client(&config).unwrap();
    let source = HttpSource::for_query(client, &config, "eggs").unwrap();

    let scraper = KrogerScraper::new(Arc::new(config));
    let err = scraper.scrape(&source).await.unwrap_err();

    match err {
        ScrapeError::UnexpectedStatus { status, url } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/search?query=eggs"), "url was {}", url);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn page_without_state_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>blocked</body></html>"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = create_client(&config).unwrap();
    let source = HttpSource::for_query(client, &config, "eggs").unwrap();

    let scraper = KrogerScraper::new(Arc::new(config));
    assert!(scraper.scrape(&source).await.unwrap().is_empty());
}
