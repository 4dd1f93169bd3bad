use crate::geocode::MapsGeocoder;
use crate::models::{Listing, NOT_AVAILABLE, UNKNOWN_LABEL};
use crate::scrapers::browser::BrowserSession;
use crate::scrapers::traits::ListingScraper;
use crate::scrapers::types::ScrapeConfig;
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};
use url::Url;

const SITE_ORIGIN: &str = "https://www.bahamasrealty.com";
const PAGE_PARAM: &str = "page";

/// Characteristic the Area column is lifted from
const AREA_KEY: &str = "Square Feet";

const LISTING_LINK_SELECTOR: &str = "a.listing__link";
const NAME_SELECTOR: &str = r#"meta[property="og:title"]"#;
const ADDRESS_SELECTOR: &str = "span.address";
const PRICE_SELECTOR: &str = "span.price-value";
// Numbered callout ids vary per listing and the marker can sit anywhere in
// the id; the description widget id is fixed
const CALLOUT_ID_PATTERN: &str = r"info-callout-\d+";
const DESCRIPTION_SELECTOR: &str = "div#info-callout-119816";
const FEATURES_SELECTOR: &str = "div.custom-field-group#primary-categories";

/// Browser-based scraper for Bahamas Realty listings
pub struct BahamasRealtyScraper {
    session: BrowserSession,
    config: ScrapeConfig,
}

impl BahamasRealtyScraper {
    /// Create a scraper around a launched browser session
    pub fn new(session: BrowserSession, config: ScrapeConfig) -> Self {
        Self { session, config }
    }

    /// Walk the paginated search until a page stops yielding new listings
    ///
    /// A page that fails to load or capture ends the walk; the URLs gathered
    /// so far are still returned.
    fn walk_pages(&self, base_url: &str) -> Vec<String> {
        let mut listing_urls = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page = 1;

        loop {
            let page_url = page_url(base_url, page);
            info!("Visiting: {}", page_url);

            if let Err(e) = self.session.goto(&page_url) {
                warn!("Failed to load page {}: {:#}", page, e);
                break;
            }
            if !self.session.wait_for(LISTING_LINK_SELECTOR, self.config.page_settle) {
                self.session.settle(self.config.page_settle);
            }

            let html = match self.session.html() {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to capture page {}: {:#}", page, e);
                    break;
                }
            };
            let links = extract_listing_links(&Html::parse_document(&html));

            if links.is_empty() {
                info!("Page {} has no listings, stopping", page);
                break;
            }

            let new_links = absorb_links(&mut seen, links, &mut listing_urls);
            // Some searches serve the last page again for every later page number
            if new_links == 0 {
                info!("Page {} repeats earlier listings, stopping", page);
                break;
            }

            page += 1;
        }

        listing_urls
    }

    /// Load one listing page and extract every field it offers
    fn scrape_detail(&self, url: &str) -> Result<Listing> {
        info!("Scraping listing: {}", url);

        self.session.goto(url)?;
        if !self.session.wait_for(ADDRESS_SELECTOR, self.config.listing_settle) {
            self.session.settle(self.config.listing_settle);
        }

        let html = self.session.html()?;
        if html.is_empty() {
            anyhow::bail!("Got an empty page for {url}");
        }

        let mut listing = Listing::new(url);
        parse_detail_page(&Html::parse_document(&html), &mut listing);

        if self.config.geocode && listing.has_address() {
            let geocoder = MapsGeocoder::new(&self.session, self.config.geocode_wait);
            let (latitude, longitude) = geocoder.lookup(&listing.address);
            listing.latitude = latitude;
            listing.longitude = longitude;
        } else {
            debug!("Skipping geocoding for {}", url);
        }

        Ok(listing)
    }
}

#[async_trait]
impl ListingScraper for BahamasRealtyScraper {
    async fn collect_listing_urls(&self, base_url: &str) -> Result<Vec<String>> {
        info!("Enumerating listings from {}", base_url);
        let urls = self.walk_pages(base_url);
        info!("Length of listing URLs: {}", urls.len());
        Ok(urls)
    }

    async fn scrape_listing(&self, url: &str) -> Result<Listing> {
        self.scrape_detail(url)
    }

    fn source_name(&self) -> &'static str {
        "Bahamas Realty"
    }
}

/// URL for one page of the paginated search
fn page_url(base_url: &str, page: usize) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{PAGE_PARAM}={page}")
}

/// Every listing link on a search results page, resolved against the site origin
fn extract_listing_links(document: &Html) -> Vec<String> {
    let link_selector = Selector::parse(LISTING_LINK_SELECTOR).unwrap();
    let origin = Url::parse(SITE_ORIGIN).unwrap();

    document
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| origin.join(href).ok())
        .filter(|resolved| resolved.scheme().starts_with("http"))
        .map(String::from)
        .collect()
}

/// Fold one page of links into the walk, returning how many were new
///
/// A zero return is the walk's stop signal: the page was empty or repeated
/// links from earlier pages.
fn absorb_links(
    seen: &mut HashSet<String>,
    links: Vec<String>,
    listing_urls: &mut Vec<String>,
) -> usize {
    let mut new_links = 0;
    for link in links {
        if seen.insert(link.clone()) {
            debug!("{}", link);
            listing_urls.push(link);
            new_links += 1;
        }
    }
    new_links
}

/// Fill `listing` from a detail page, leaving placeholders where fields are missing
fn parse_detail_page(document: &Html, listing: &mut Listing) {
    if let Some(name) = parse_name(document) {
        listing.name = name;
    }
    if let Some(address) = parse_address(document) {
        listing.address = address;
    }
    if let Some(price) = parse_price(document) {
        listing.price = price;
    }

    listing.characteristics = parse_characteristics(document);
    if let Some(area) = listing.characteristics.get(AREA_KEY) {
        listing.area = area.clone();
    }

    if let Some(description) = parse_description(document) {
        listing.description = description;
    }
    listing.features = parse_features(document);
}

fn parse_name(document: &Html) -> Option<String> {
    let selector = Selector::parse(NAME_SELECTOR).unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

fn parse_address(document: &Html) -> Option<String> {
    let selector = Selector::parse(ADDRESS_SELECTOR).unwrap();
    first_text(document, &selector)
}

fn parse_price(document: &Html) -> Option<String> {
    let selector = Selector::parse(PRICE_SELECTOR).unwrap();
    first_text(document, &selector)
}

/// Key/value rows from the first numbered info callout on the page
fn parse_characteristics(document: &Html) -> BTreeMap<String, String> {
    let div_selector = Selector::parse("div").unwrap();
    let item_selector = Selector::parse("li").unwrap();
    let label_selector = Selector::parse("strong").unwrap();
    let value_selector = Selector::parse("span").unwrap();
    let numbered = Regex::new(CALLOUT_ID_PATTERN).unwrap();

    let mut characteristics = BTreeMap::new();

    let section = document
        .select(&div_selector)
        .find(|div| div.value().id().is_some_and(|id| numbered.is_match(id)));

    if let Some(section) = section {
        for item in section.select(&item_selector) {
            let key = item
                .select(&label_selector)
                .next()
                .map(element_text)
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
            let value = item
                .select(&value_selector)
                .next()
                .map(element_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            characteristics.insert(key, value);
        }
    }

    characteristics
}

fn parse_description(document: &Html) -> Option<String> {
    let callout_selector = Selector::parse(DESCRIPTION_SELECTOR).unwrap();
    let inner_selector = Selector::parse("div").unwrap();

    document
        .select(&callout_selector)
        .next()?
        .select(&inner_selector)
        .next()
        .map(element_text)
}

/// Labelled amenity rows from the primary categories group
fn parse_features(document: &Html) -> BTreeMap<String, String> {
    let group_selector = Selector::parse(FEATURES_SELECTOR).unwrap();
    let field_selector = Selector::parse("li.field").unwrap();
    let name_selector = Selector::parse("span.field-name").unwrap();
    let value_selector = Selector::parse("span.field-value").unwrap();

    let mut features = BTreeMap::new();

    if let Some(section) = document.select(&group_selector).next() {
        for field in section.select(&field_selector) {
            // Rows without a label carry no usable field
            let Some(name) = field.select(&name_selector).next() else {
                continue;
            };
            let name = element_text(name).replace(':', "");
            let value = field
                .select(&value_selector)
                .next()
                .map(element_text)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            features.insert(name, value);
        }
    }

    features
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
