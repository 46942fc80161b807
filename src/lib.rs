pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod scrapers;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::ScrapeError;
pub use models::{FulfillmentOption, FulfillmentType, ProductRecord};
pub use parsers::{extract_initial_state, lookup, lookup_or, lookup_strict, PathStep};
pub use scrapers::{
    extract_products, project_products, scrape_html, FileSource, HttpSource, KrogerScraper,
    PageSource, ProjectOptions, ProjectionStats,
};
pub use storage::{SqliteStorage, Storage};
