use crate::models::Listing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all listing scrapers
/// This allows easy addition of new sites without touching the pipeline
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// Enumerate every listing URL reachable from a paginated search URL
    async fn collect_listing_urls(&self, base_url: &str) -> Result<Vec<String>>;

    /// Scrape a single listing page into a record
    async fn scrape_listing(&self, url: &str) -> Result<Listing>;

    /// Get the name of the site this scraper understands
    fn source_name(&self) -> &'static str;
}
