use anyhow::{Context, Result};
use serde_json::Value;
use std::env;
use std::fs;

use kroger_scraper::parsers::{extract_initial_state, lookup};
use kroger_scraper::scrapers::{
    get_front_image_url, get_fulfillment_options, product_list, project_products,
    ProjectOptions, PRODUCTS_PATH,
};
use kroger_scraper::PathStep;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .context("usage: inspect_state <saved-search-page.html>")?;
    let html = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;

    let state = extract_initial_state(&html)?;

    match &state {
        Value::Object(map) if map.is_empty() => {
            println!("No __INITIAL_STATE__ assignment found in {}", path);
            return Ok(());
        }
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            println!("Top-level state keys: {}", keys.join(", "));
        }
        other => println!("State is not an object: {}", other),
    }

    // Walk the product path one step at a time to show where it stops resolving
    for depth in 1..=PRODUCTS_PATH.len() {
        let prefix = &PRODUCTS_PATH[..depth];
        if lookup(&state, prefix).is_none() {
            println!(
                "Product path stops resolving at {}",
                kroger_scraper::parsers::render_path(prefix)
            );
            break;
        }
    }

    let items = product_list(&state);
    let (records, stats) = project_products(&state, ProjectOptions::default());
    println!(
        "{} list entries: {} records, {} dropped, {} non-object",
        items.len(),
        records.len(),
        stats.dropped,
        stats.skipped
    );

    for (index, item) in items.iter().enumerate() {
        let id = lookup(item, &[PathStep::Key("id")]).cloned().unwrap_or(Value::Null);
        let fulfillment: Vec<String> = get_fulfillment_options(item)
            .iter()
            .map(|option| match &option.timeframe {
                Some(timeframe) => format!("{} ({})", option.kind, timeframe),
                None => option.kind.to_string(),
            })
            .collect();
        let front_image = lookup(item, &[PathStep::Key("item")])
            .map(get_front_image_url)
            .unwrap_or_default();

        println!(
            "#{} id={} fulfillment=[{}] front_image={}",
            index,
            id,
            fulfillment.join(", "),
            if front_image.is_empty() { "-" } else { front_image.as_str() }
        );
    }

    Ok(())
}
