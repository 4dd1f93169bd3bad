use crate::models::NOT_AVAILABLE;
use crate::scrapers::browser::BrowserSession;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

/// Coordinate pair the map service embeds in its URL once a search resolves
const COORD_PATTERN: &str = r"@(-?\d+\.\d+),(-?\d+\.\d+)";

const MAPS_SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// Resolves street addresses to coordinates by loading a map search in the
/// shared tab and reading the pair back out of the redirect URL
pub struct MapsGeocoder<'a> {
    session: &'a BrowserSession,
    wait: Duration,
}

impl<'a> MapsGeocoder<'a> {
    pub fn new(session: &'a BrowserSession, wait: Duration) -> Self {
        Self { session, wait }
    }

    /// Best-effort lookup; any failure yields the placeholder pair
    pub fn lookup(&self, address: &str) -> (String, String) {
        let url = search_url(address);
        debug!("Geocoding via {}", url);

        if let Err(e) = self.session.goto(&url) {
            warn!("Error fetching latitude and longitude: {:#}", e);
            return placeholder_coords();
        }

        let pattern = coord_regex();
        let resolved = self
            .session
            .wait_for_url(|current| pattern.is_match(current), self.wait)
            .and_then(|current| parse_coords(&current));

        match resolved {
            Some((latitude, longitude)) => {
                debug!("Latitude: {}, Longitude: {}", latitude, longitude);
                (latitude, longitude)
            }
            None => {
                warn!("Map search did not resolve coordinates for '{}'", address);
                placeholder_coords()
            }
        }
    }
}

fn placeholder_coords() -> (String, String) {
    (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
}

fn coord_regex() -> Regex {
    Regex::new(COORD_PATTERN).unwrap()
}

/// Map search URL for an address
pub fn search_url(address: &str) -> String {
    format!("{}{}", MAPS_SEARCH_BASE, urlencoding::encode(address))
}

/// Pull the `@lat,lng` pair out of a map result URL
pub fn parse_coords(url: &str) -> Option<(String, String)> {
    let caps = coord_regex().captures(url)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_percent_encodes_the_address() {
        assert_eq!(
            search_url("16 Village Road, Nassau"),
            "https://www.google.com/maps/search/16%20Village%20Road%2C%20Nassau"
        );
    }

    #[test]
    fn parse_coords_reads_the_redirect_url() {
        let url = "https://www.google.com/maps/place/Nassau/@25.0443312,-77.3503609,12z/data=!3m1";
        assert_eq!(
            parse_coords(url),
            Some(("25.0443312".to_string(), "-77.3503609".to_string()))
        );
    }

    #[test]
    fn parse_coords_takes_the_first_pair() {
        let url = "https://maps.example/@10.5,20.25,12z/@99.9,-88.8";
        assert_eq!(parse_coords(url), Some(("10.5".to_string(), "20.25".to_string())));
    }

    #[test]
    fn parse_coords_requires_decimal_points() {
        assert_eq!(parse_coords("https://www.google.com/maps/search/foo"), None);
        assert_eq!(parse_coords("https://maps.example/@25,-77,12z"), None);
    }

    #[test]
    fn parse_coords_handles_negative_latitude() {
        let url = "https://maps.example/@-33.8688,151.2093,10z";
        assert_eq!(
            parse_coords(url),
            Some(("-33.8688".to_string(), "151.2093".to_string()))
        );
    }
}
