use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::error::ScrapeError;
use crate::scrapers::PageSource;
use crate::utils::http::fetch_page;

/// A page saved to disk earlier.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FileSource {
    async fn fetch(&self) -> Result<String, ScrapeError> {
        info!("Reading page from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ScrapeError::Io {
                path: self.path.clone(),
                source,
            })?;

        // Saved pages are not always clean UTF-8; decode lossily like the HTTP path
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }
}

/// A live search results page.
pub struct HttpSource {
    client: Client,
    url: Url,
    query: String,
}

impl HttpSource {
    pub fn new(client: Client, url: Url, query: impl Into<String>) -> Self {
        Self {
            client,
            url,
            query: query.into(),
        }
    }

    pub fn for_query(client: Client, config: &Config, query: &str) -> Result<Self, ScrapeError> {
        let url = config.search_url_for(query)?;
        Ok(Self::new(client, url, query))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self) -> Result<String, ScrapeError> {
        fetch_page(&self.client, self.url.as_str()).await
    }

    fn label(&self) -> String {
        self.query.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = FileSource::new("/definitely/not/here.html");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.html"));
    }

    #[tokio::test]
    async fn invalid_utf8_in_saved_page_is_replaced() {
        let dir = std::env::temp_dir().join(format!("kroger-scraper-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("latin1.html");

        let mut bytes = b"<html><body>Caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"<script>window.__INITIAL_STATE__ = JSON.parse('{}')</script></body></html>");
        std::fs::write(&path, &bytes).unwrap();

        let html = FileSource::new(&path).fetch().await.unwrap();
        assert!(html.contains("Caf\u{FFFD}"));
        assert!(html.contains("window.__INITIAL_STATE__"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn query_source_uses_configured_template() {
        let config = Config::default();
        let source = HttpSource::for_query(Client::new(), &config, "eggs").unwrap();
        assert_eq!(source.url().as_str(), "https://www.kroger.com/search?query=eggs");
        assert_eq!(source.label(), "eggs");
    }
}
