//! End-to-end runs of markup through state location and product projection.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

use kroger_scraper::parsers::ERROR_MARKER;
use kroger_scraper::{
    extract_initial_state, scrape_html, Config, FileSource, KrogerScraper, ProductRecord,
    ProjectOptions, ScrapeError,
};

/// Inline `state` into a page the way the retailer's renderer does.
fn page_with_state(state: &Value) -> String {
    let json_text = serde_json::to_string(state).unwrap();
    let escaped = json_text.replace('\\', "\\\\").replace('"', "\\\"");
    page_with_script(&format!("window.__INITIAL_STATE__ = JSON.parse(\"{}\");", escaped))
}

fn page_with_script(script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Search</title>
  <script src="https://cdn.example/vendor.js"></script>
  <script>window.dataLayer = window.dataLayer || [];</script>
</head>
<body>
  <div id="root"></div>
  <script>{}</script>
</body>
</html>"#,
        script
    )
}

fn search_state(products: Value) -> Value {
    json!({
        "calypso": {
            "useCases": {
                "getProducts": {
                    "search-grid": {
                        "response": { "data": { "products": products } }
                    }
                }
            }
        }
    })
}

fn whole_milk() -> Value {
    json!({
        "id": "123",
        "item": {
            "description": "Whole Milk",
            "romanceDescription": "Fresh from the farm.",
            "brand": { "name": "Kroger" },
            "images": [ { "url": "https://www.kroger.com/product/images/large/front/0001111041700" } ],
            "shareLink": "https://www.kroger.com/p/kroger-whole-milk/0001111041700"
        },
        "price": { "storePrices": { "regular": { "defaultDescription": "$3.99" } } }
    })
}

fn whole_milk_record() -> ProductRecord {
    ProductRecord {
        id: Some("123".to_string()),
        description: Some("Fresh from the farm.".to_string()),
        name: Some("Whole Milk".to_string()),
        brand: Some("Kroger".to_string()),
        price: Some("$3.99".to_string()),
        image_url: Some("https://www.kroger.com/product/images/large/front/0001111041700".to_string()),
        product_url: Some("https://www.kroger.com/p/kroger-whole-milk/0001111041700".to_string()),
    }
}

#[test]
fn page_without_scripts_yields_no_records() {
    let html = "<html><body><h1>No results</h1></body></html>";
    let records = scrape_html(html, ProjectOptions::default()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn state_without_use_cases_yields_no_records() {
    let html = page_with_script(r#"window.__INITIAL_STATE__ = JSON.parse("{\"calypso\":{}}")"#);

    assert_eq!(extract_initial_state(&html).unwrap(), json!({"calypso": {}}));
    assert!(scrape_html(&html, ProjectOptions::default()).unwrap().is_empty());
}

#[test]
fn complete_item_yields_one_record() {
    let html = page_with_state(&search_state(json!([whole_milk()])));
    let records = scrape_html(&html, ProjectOptions::default()).unwrap();
    assert_eq!(records, vec![whole_milk_record()]);
}

#[test]
fn malformed_item_is_dropped_while_sibling_survives() {
    let mut broken = whole_milk();
    broken["id"] = json!("999");
    broken["price"] = json!("$3.99");

    let html = page_with_state(&search_state(json!([broken, whole_milk()])));
    let records = scrape_html(&html, ProjectOptions::default()).unwrap();
    assert_eq!(records, vec![whole_milk_record()]);
}

#[test]
fn only_malformed_item_yields_no_records() {
    let mut broken = whole_milk();
    broken["price"] = json!("$3.99");

    let html = page_with_state(&search_state(json!([broken])));
    assert!(scrape_html(&html, ProjectOptions::default()).unwrap().is_empty());
}

#[test]
fn truncated_payload_is_a_decode_error_with_offset() {
    // Unescapes to `{"calypso":{"useCases":` which ends at char 23.
    let html = page_with_script(
        r#"window.__INITIAL_STATE__ = JSON.parse("{\"calypso\":{\"useCases\":")"#,
    );

    let err = scrape_html(&html, ProjectOptions::default()).unwrap_err();
    assert!(err.is_decode());

    let message = err.to_string();
    assert!(message.contains("char 23"), "message was: {}", message);
    assert!(message.contains(&format!("\"useCases\":{}", ERROR_MARKER)));

    match err {
        ScrapeError::Decode { offset, .. } => assert_eq!(offset, 23),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn escaped_quotes_inside_values_survive_the_round_trip() {
    let mut item = whole_milk();
    item["item"]["description"] = json!("Milk \"Vitamin D\" Gallon");
    item["item"]["romanceDescription"] = json!("Path C:\\farm");

    let html = page_with_state(&search_state(json!([item])));
    let records = scrape_html(&html, ProjectOptions::default()).unwrap();

    assert_eq!(records[0].name.as_deref(), Some("Milk \"Vitamin D\" Gallon"));
    assert_eq!(records[0].description.as_deref(), Some("Path C:\\farm"));
}

#[tokio::test]
async fn scraper_reads_saved_page_from_disk() {
    let dir = std::env::temp_dir().join(format!("kroger-scraper-pipeline-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("milk.html");
    std::fs::write(&path, page_with_state(&search_state(json!([whole_milk(), 42])))).unwrap();

    let scraper = KrogerScraper::new(Arc::new(Config::default()));
    let records = scraper.scrape(&FileSource::new(&path)).await.unwrap();
    assert_eq!(records, vec![whole_milk_record()]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn scraper_applies_description_cleanup_from_config() {
    let dir = std::env::temp_dir().join(format!("kroger-scraper-clean-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("milk.html");

    let mut item = whole_milk();
    item["item"]["romanceDescription"] = json!("<li>Grade A</li><li>Pasteurized</li>");
    std::fs::write(&path, page_with_state(&search_state(json!([item])))).unwrap();

    let config = Config {
        clean_descriptions: true,
        ..Config::default()
    };
    let scraper = KrogerScraper::new(Arc::new(config));
    let records = scraper.scrape(&FileSource::new(&path)).await.unwrap();
    assert_eq!(records[0].description.as_deref(), Some("• Grade A\n• Pasteurized"));

    std::fs::remove_dir_all(&dir).unwrap();
}
