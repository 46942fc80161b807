use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ScrapeError;

pub fn create_client(config: &Config) -> Result<Client, ScrapeError> {
    let client = ClientBuilder::new()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .cookie_store(true)
        .build()?;

    Ok(client)
}

/// Single GET of a page body. Non-success statuses are errors.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        warn!("HTTP error {}: {}", status, url);
        return Err(ScrapeError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    info!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}
