use crate::models::Listing;
use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;

/// Column layout of the exported sheet
const HEADERS: [&str; 11] = [
    "URL",
    "Name",
    "Description",
    "Address",
    "Area",
    "Price",
    "Characteristics",
    "Features",
    "Latitude",
    "Longitude",
    "Scraped At",
];

/// Characters that cannot appear in a file name on common filesystems
const FORBIDDEN_FILE_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Render the collected listings into xlsx bytes, one row per listing
pub fn build_workbook(listings: &[Listing]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .with_context(|| format!("Failed to write header '{header}'"))?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let row = (i + 1) as u32;
        let characteristics = nested_cell(&listing.characteristics)?;
        let features = nested_cell(&listing.features)?;
        let scraped_at = listing.scraped_at.to_rfc3339();

        let cells = [
            listing.url.as_str(),
            listing.name.as_str(),
            listing.description.as_str(),
            listing.address.as_str(),
            listing.area.as_str(),
            listing.price.as_str(),
            characteristics.as_str(),
            features.as_str(),
            listing.latitude.as_str(),
            listing.longitude.as_str(),
            scraped_at.as_str(),
        ];

        for (col, cell) in cells.iter().enumerate() {
            worksheet
                .write_string(row, col as u16, *cell)
                .with_context(|| format!("Failed to write row {row}"))?;
        }
    }

    workbook.save_to_buffer().context("Failed to save workbook")
}

/// Nested mappings are stored as JSON so one cell can hold the whole group
fn nested_cell(map: &BTreeMap<String, String>) -> Result<String> {
    serde_json::to_string(map).context("Failed to encode nested cell")
}

/// Workbook file name derived from the base URL it was scraped from
///
/// Slashes become underscores, the scheme colon is dropped, and anything a
/// filesystem would reject is removed.
pub fn workbook_file_name(base_url: &str) -> String {
    let flattened = base_url.replace('/', "_").replace(':', "");
    let cleaned: String = flattened
        .chars()
        .filter(|c| !FORBIDDEN_FILE_CHARS.contains(c))
        .collect();
    format!("{cleaned}.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> Listing {
        let mut listing = Listing::new("https://www.bahamasrealty.com/listing/ocean-view-estate-123");
        listing.name = "Ocean View Estate".to_string();
        listing.address = "16 Village Road, Nassau".to_string();
        listing.price = "$1,250,000".to_string();
        listing.area = "2,800".to_string();
        listing
            .characteristics
            .insert("Bedrooms".to_string(), "4".to_string());
        listing
            .characteristics
            .insert("Bathrooms".to_string(), "3".to_string());
        listing
            .features
            .insert("Pool".to_string(), "In-ground".to_string());
        listing
    }

    #[test]
    fn workbook_bytes_are_a_zip_archive() {
        let buffer = build_workbook(&[sample_listing()]).unwrap();
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn an_empty_run_still_produces_a_workbook() {
        let buffer = build_workbook(&[]).unwrap();
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn nested_cells_are_sorted_json() {
        let listing = sample_listing();
        assert_eq!(
            nested_cell(&listing.characteristics).unwrap(),
            r#"{"Bathrooms":"3","Bedrooms":"4"}"#
        );
        assert_eq!(
            nested_cell(&listing.features).unwrap(),
            r#"{"Pool":"In-ground"}"#
        );
    }

    #[test]
    fn file_name_flattens_the_default_search_url() {
        let name = workbook_file_name(
            "https://www.bahamasrealty.com/listings/?status=Active,Pending,Active+Under+Contract,Closed,CNT,PCG",
        );
        assert_eq!(
            name,
            "https__www.bahamasrealty.com_listings_status=Active,Pending,Active+Under+Contract,Closed,CNT,PCG.xlsx"
        );
    }

    #[test]
    fn file_name_drops_forbidden_characters() {
        assert_eq!(
            workbook_file_name("https://example.com/a?b=\"1\"|<2>"),
            "https__example.com_ab=12.xlsx"
        );
    }
}
