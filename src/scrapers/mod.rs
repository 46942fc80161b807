use async_trait::async_trait;

use crate::error::ScrapeError;

mod kroger;
mod source;

pub use kroger::*;
pub use source::{FileSource, HttpSource};

/// Something that yields the raw markup of one search page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self) -> Result<String, ScrapeError>;
    /// Human-readable name for logs and result lines.
    fn label(&self) -> String;
}
