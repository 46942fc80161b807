use async_trait::async_trait;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::models::ProductRecord;
use crate::storage::Storage;

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .context("Failed to open SQLite database")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection mutex poisoned"))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                retailer TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                product_id TEXT,
                name TEXT,
                description TEXT,
                brand TEXT,
                price TEXT,
                image_url TEXT,
                product_url TEXT,
                scraped_at TEXT NOT NULL,
                PRIMARY KEY (retailer, fingerprint)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_products_retailer_id ON products(retailer, product_id)",
            [],
        )?;

        info!("Database migration completed");
        Ok(())
    }

    async fn save_products(&self, retailer: &str, products: &[ProductRecord]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let scraped_at = Utc::now().to_rfc3339();
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO products
                    (retailer, fingerprint, product_id, name, description, brand, price, image_url, product_url, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for product in products {
                inserted += stmt.execute(params![
                    retailer,
                    product.fingerprint().0,
                    product.id,
                    product.name,
                    product.description,
                    product.brand,
                    product.price,
                    product.image_url,
                    product.product_url,
                    scraped_at,
                ])?;
            }
        }

        tx.commit().context("Failed to commit product batch")?;
        info!(
            "Saved {} new products for {} ({} already stored)",
            inserted,
            retailer,
            products.len() - inserted
        );
        Ok(inserted)
    }

    async fn products_for(&self, retailer: &str) -> Result<Vec<ProductRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT product_id, description, name, brand, price, image_url, product_url
             FROM products WHERE retailer = ?1 ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![retailer], |row| {
            Ok(ProductRecord {
                id: row.get(0)?,
                description: row.get(1)?,
                name: row.get(2)?,
                brand: row.get(3)?,
                price: row.get(4)?,
                image_url: row.get(5)?,
                product_url: row.get(6)?,
            })
        })?;

        let products = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read stored products")?;
        Ok(products)
    }
}
