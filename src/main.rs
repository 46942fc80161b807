use anyhow::{bail, Result};
use clap::Parser;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use kroger_scraper::utils::http::create_client;
use kroger_scraper::{
    Config, FileSource, HttpSource, KrogerScraper, PageSource, SqliteStorage, Storage,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Search terms to fetch from the retailer.
    queries: Vec<String>,

    /// Saved search page to scrape instead of fetching (repeatable).
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Explicit configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not write results to the database.
    #[arg(long)]
    no_save: bool,

    /// Print each record as a JSON line on stdout.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kroger_scraper=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.queries.is_empty() && cli.files.is_empty() {
        bail!("Nothing to scrape: pass a search term or --file <PATH>");
    }

    let config = Arc::new(Config::load(cli.config.as_deref())?);

    let storage = if cli.no_save {
        None
    } else {
        let storage = SqliteStorage::new(&config.database_path).await?;
        storage.migrate().await?;
        Some(Arc::new(storage))
    };

    let mut sources: Vec<Box<dyn PageSource>> = Vec::new();
    if !cli.queries.is_empty() {
        let client = create_client(&config)?;
        for query in &cli.queries {
            sources.push(Box::new(HttpSource::for_query(client.clone(), &config, query)?));
        }
    }
    for path in &cli.files {
        sources.push(Box::new(FileSource::new(path)));
    }

    let scraper = KrogerScraper::new(config.clone());
    info!("Processing {} pages", sources.len());

    // Pages are independent; each one's records are saved as a single batch
    let page_futures = sources.iter().map(|source| {
        let scraper = &scraper;
        let storage = storage.clone();
        let json = cli.json;

        async move {
            let label = source.label();
            let products = scraper.scrape(source.as_ref()).await?;

            if json {
                for product in &products {
                    println!("{}", serde_json::to_string(product)?);
                }
                info!("{} results for {}", products.len(), label);
            } else {
                println!("{} results for {}", products.len(), label);
            }

            if let Some(storage) = storage {
                storage.save_products(scraper.retailer_name(), &products).await?;
            }

            Ok::<(), anyhow::Error>(())
        }
    });

    let results = join_all(page_futures).await;

    let mut failures = 0;
    for (source, result) in sources.iter().zip(results) {
        if let Err(e) = result {
            error!("Failed to scrape {}: {:#}", source.label(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} pages failed", failures, sources.len());
    }

    Ok(())
}
