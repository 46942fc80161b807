use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ScrapeError;
use crate::models::{FulfillmentOption, FulfillmentType, ProductRecord};
use crate::parsers::{
    as_text, clean_description, extract_initial_state, is_truthy, lookup, lookup_or,
    lookup_strict, PathStep, StructuralMismatch,
};
use crate::scrapers::PageSource;

use PathStep::{Index, Key};

/// Where the search grid keeps its products inside the initial state.
pub const PRODUCTS_PATH: &[PathStep<'static>] = &[
    Key("calypso"),
    Key("useCases"),
    Key("getProducts"),
    Key("search-grid"),
    Key("response"),
    Key("data"),
    Key("products"),
];

const ID_PATH: &[PathStep<'static>] = &[Key("id")];
const DESCRIPTION_PATH: &[PathStep<'static>] = &[Key("item"), Key("romanceDescription")];
const NAME_PATH: &[PathStep<'static>] = &[Key("item"), Key("description")];
const BRAND_PATH: &[PathStep<'static>] = &[Key("item"), Key("brand"), Key("name")];
const PRICE_PATH: &[PathStep<'static>] = &[
    Key("price"),
    Key("storePrices"),
    Key("regular"),
    Key("defaultDescription"),
];
const IMAGE_PATH: &[PathStep<'static>] = &[Key("item"), Key("images"), Index(0), Key("url")];
const PRODUCT_URL_PATH: &[PathStep<'static>] = &[Key("item"), Key("shareLink")];

static EMPTY_LIST: Value = Value::Array(Vec::new());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectOptions {
    pub clean_descriptions: bool,
}

impl From<&Config> for ProjectOptions {
    fn from(config: &Config) -> Self {
        Self {
            clean_descriptions: config.clean_descriptions,
        }
    }
}

/// Per-page item accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    pub kept: usize,
    /// Objects dropped because a required path crossed the wrong shape.
    pub dropped: usize,
    /// List entries that were not objects at all.
    pub skipped: usize,
}

pub struct KrogerScraper {
    config: Arc<Config>,
}

impl KrogerScraper {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn retailer_name(&self) -> &str {
        &self.config.retailer_name
    }

    pub async fn scrape(&self, source: &dyn PageSource) -> Result<Vec<ProductRecord>, ScrapeError> {
        info!("Scraping {} for {}...", self.retailer_name(), source.label());
        let html = source.fetch().await?;
        scrape_html(&html, ProjectOptions::from(self.config.as_ref()))
    }
}

/// Markup to records: locate the state, then project its product list.
pub fn scrape_html(html: &str, options: ProjectOptions) -> Result<Vec<ProductRecord>, ScrapeError> {
    let state = extract_initial_state(html)?;
    Ok(extract_products(&state, options))
}

/// The located product list, or an empty slice when the path is absent or
/// does not end in an array.
pub fn product_list(state: &Value) -> &[Value] {
    lookup_or(state, PRODUCTS_PATH, &EMPTY_LIST)
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn text_at(item: &Value, path: &[PathStep<'_>]) -> Result<Option<String>, StructuralMismatch> {
    Ok(lookup_strict(item, path)?.and_then(as_text))
}

/// Build one record from a product object.
///
/// `id` is read tolerantly. Every other field is read strictly: a missing or
/// null final key leaves the field empty, but crossing a non-object (or an
/// empty `images` list) on the way fails the whole item.
pub fn build_record(item: &Value, options: ProjectOptions) -> Result<ProductRecord, StructuralMismatch> {
    let mut description = text_at(item, DESCRIPTION_PATH)?;
    if options.clean_descriptions {
        description = description.map(|desc| clean_description(&desc));
    }

    Ok(ProductRecord {
        id: lookup(item, ID_PATH).and_then(as_text),
        description,
        name: text_at(item, NAME_PATH)?,
        brand: text_at(item, BRAND_PATH)?,
        price: text_at(item, PRICE_PATH)?,
        image_url: text_at(item, IMAGE_PATH)?,
        product_url: text_at(item, PRODUCT_URL_PATH)?,
    })
}

/// Project every usable product in `state`, preserving source order.
pub fn project_products(state: &Value, options: ProjectOptions) -> (Vec<ProductRecord>, ProjectionStats) {
    let mut stats = ProjectionStats::default();
    let mut records = Vec::new();

    for (index, item) in product_list(state).iter().enumerate() {
        if !item.is_object() {
            stats.skipped += 1;
            continue;
        }

        match build_record(item, options) {
            Ok(record) => {
                stats.kept += 1;
                records.push(record);
            }
            Err(mismatch) => {
                debug!("Dropping product #{}: {}", index, mismatch);
                stats.dropped += 1;
            }
        }
    }

    info!(
        "Projected {} products ({} dropped, {} non-object entries skipped)",
        stats.kept, stats.dropped, stats.skipped
    );
    (records, stats)
}

pub fn extract_products(state: &Value, options: ProjectOptions) -> Vec<ProductRecord> {
    project_products(state, options).0
}

const FULFILLMENT_FLAGS: [(FulfillmentType, &str, &str); 3] = [
    (FulfillmentType::Pickup, "availableForPickup", "pickupDate"),
    (FulfillmentType::Delivery, "availableForDelivery", "deliveryDate"),
    (FulfillmentType::Shipping, "availableForShipping", "shippingEstimate"),
];

/// Fulfillment methods flagged available on a product object, in
/// pickup/delivery/shipping order. Never fails; odd shapes yield nothing.
pub fn get_fulfillment_options(item: &Value) -> Vec<FulfillmentOption> {
    FULFILLMENT_FLAGS
        .iter()
        .filter(|(_, flag, _)| lookup(item, &[Key("fulfillment"), Key(flag)]).map_or(false, is_truthy))
        .map(|(kind, _, timeframe)| FulfillmentOption {
            kind: *kind,
            timeframe: lookup(item, &[Key("fulfillment"), Key(timeframe)]).and_then(as_text),
        })
        .collect()
}

/// URL of the first size of the first `front` perspective image of an object
/// holding an `images` list. Empty when there is none.
pub fn get_front_image_url(item: &Value) -> String {
    let Some(images) = lookup(item, &[Key("images")]).and_then(Value::as_array) else {
        return String::new();
    };

    images
        .iter()
        .find(|image| lookup(image, &[Key("perspective")]).and_then(Value::as_str) == Some("front"))
        .and_then(|image| lookup(image, &[Key("sizes"), Index(0), Key("url")]))
        .and_then(as_text)
        .unwrap_or_default()
}
