use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::ScrapeError;

/// Placeholder in `search_url` replaced by the encoded search term.
pub const QUERY_PLACEHOLDER: &str = "QUERY";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub retailer_name: String,
    pub search_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub database_path: String,
    pub clean_descriptions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retailer_name: "Kroger".to_string(),
            search_url: "https://www.kroger.com/search?query=QUERY".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 25,
            database_path: "kroger_scraper.db".to_string(),
            clean_descriptions: false,
        }
    }
}

impl Config {
    /// Defaults, then `kroger_scraper.{toml,json,yaml}` in the working
    /// directory (or `path` when given), then `KROGER_SCRAPER_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::default();

        let mut builder = config::Config::builder()
            .set_default("retailer_name", defaults.retailer_name)?
            .set_default("search_url", defaults.search_url)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("database_path", defaults.database_path)?
            .set_default("clean_descriptions", defaults.clean_descriptions)?;

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("kroger_scraper").required(false)),
        };

        builder
            .add_source(config::Environment::with_prefix("KROGER_SCRAPER"))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Search page URL for `term`.
    pub fn search_url_for(&self, term: &str) -> Result<Url, ScrapeError> {
        let encoded = utf8_percent_encode(term.trim(), NON_ALPHANUMERIC).to_string();
        let raw = self.search_url.replace(QUERY_PLACEHOLDER, &encoded);
        Url::parse(&raw).map_err(|source| ScrapeError::InvalidUrl { url: raw, source })
    }
}
