use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The embedded state assignment was found but its payload is not valid JSON.
    #[error("JSON parsing error at char {offset} (line {line}, column {column}): {source}\nError snippet:\n{snippet}")]
    Decode {
        offset: usize,
        line: usize,
        column: usize,
        snippet: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read page from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid search URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ScrapeError {
    pub fn is_decode(&self) -> bool {
        matches!(self, ScrapeError::Decode { .. })
    }
}
