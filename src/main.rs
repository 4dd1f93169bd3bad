mod export;
mod geocode;
mod models;
mod scrapers;

use anyhow::{Context, Result};
use models::Listing;
use scrapers::{read_url_file, BahamasRealtyScraper, BrowserSession, ListingScraper, ScrapeConfig};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏝️ Listing Scout - Bahamas Realty Scraper");
    info!("==========================================");
    info!("");

    let config = ScrapeConfig::from_env();
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let session = BrowserSession::launch(&config)?;
    let scraper = BahamasRealtyScraper::new(session, config.clone());

    run(&scraper, &config).await
}

async fn run(scraper: &dyn ListingScraper, config: &ScrapeConfig) -> Result<()> {
    info!("Starting browser-based scrape of {}", scraper.source_name());
    info!("This will visit each listing page for detailed information");
    info!("");

    // A URL file bypasses the search walk and scrapes exactly its listings
    if let Some(path) = &config.url_file {
        let urls = read_url_file(path)?;
        info!("Read {} listing URLs from {}", urls.len(), path.display());

        let export_key = config
            .base_urls
            .first()
            .map(String::as_str)
            .unwrap_or(scrapers::types::DEFAULT_BASE_URL);
        return scrape_and_export(scraper, config, &urls, export_key).await;
    }

    for base_url in &config.base_urls {
        let urls = match scraper.collect_listing_urls(base_url).await {
            Ok(urls) => urls,
            Err(e) => {
                error!("Failed to enumerate {}: {:#}", base_url, e);
                continue;
            }
        };

        scrape_and_export(scraper, config, &urls, base_url).await?;
    }

    Ok(())
}

/// Scrape every listing URL, then write the workbook named after `export_key`
async fn scrape_and_export(
    scraper: &dyn ListingScraper,
    config: &ScrapeConfig,
    urls: &[String],
    export_key: &str,
) -> Result<()> {
    let listings = scrape_all(scraper, urls).await;

    info!("✅ Scraped {} listings", listings.len());
    info!("");

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.name, listing.price);
        println!("   {}", listing.address);
        println!("   Area: {}", listing.area);
        println!("   Coordinates: {}, {}", listing.latitude, listing.longitude);
        println!("   URL: {}", listing.url);
        println!();
    }

    save_workbook(&listings, config, export_key).await
}

/// Scrape listings one at a time; a failed page is logged and skipped
async fn scrape_all(scraper: &dyn ListingScraper, urls: &[String]) -> Vec<Listing> {
    let mut listings = Vec::new();

    for url in urls {
        match scraper.scrape_listing(url).await {
            Ok(listing) => {
                if let Ok(record) = serde_json::to_string(&listing) {
                    debug!("{}", record);
                }
                listings.push(listing);
            }
            Err(e) => warn!("Skipping {}: {:#}", url, e),
        }
    }

    listings
}

async fn save_workbook(listings: &[Listing], config: &ScrapeConfig, base_url: &str) -> Result<()> {
    let path = config.output_dir.join(export::workbook_file_name(base_url));
    let buffer = export::build_workbook(listings)?;

    tokio::fs::write(&path, buffer)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("💾 Saved {} listings to {}", listings.len(), path.display());
    Ok(())
}
