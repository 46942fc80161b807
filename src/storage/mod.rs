use async_trait::async_trait;
use anyhow::Result;
use crate::models::ProductRecord;

mod sqlite;
pub use sqlite::SqliteStorage;

/// Sink for one page's worth of records.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn migrate(&self) -> Result<()>;
    /// Bulk insert; returns how many records were new.
    async fn save_products(&self, retailer: &str, products: &[ProductRecord]) -> Result<usize>;
    async fn products_for(&self, retailer: &str) -> Result<Vec<ProductRecord>>;
}
