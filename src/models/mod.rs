use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for any field a listing page does not expose
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a listing without a living area entry
pub const NO_AREA: &str = "-";

/// Label used for a characteristics row that carries no label of its own
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Core listing data model
///
/// Every scalar field is kept as the text the page showed so the export
/// matches the site verbatim, placeholders included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub url: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub area: String,
    pub price: String,
    pub characteristics: BTreeMap<String, String>,
    pub features: BTreeMap<String, String>,
    pub latitude: String,
    pub longitude: String,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Record for `url` with every field at its placeholder value
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            address: NOT_AVAILABLE.to_string(),
            area: NO_AREA.to_string(),
            price: NOT_AVAILABLE.to_string(),
            characteristics: BTreeMap::new(),
            features: BTreeMap::new(),
            latitude: NOT_AVAILABLE.to_string(),
            longitude: NOT_AVAILABLE.to_string(),
            scraped_at: Utc::now(),
        }
    }

    /// True when the page actually exposed an address
    pub fn has_address(&self) -> bool {
        self.address != NOT_AVAILABLE && !self.address.is_empty()
    }
}
