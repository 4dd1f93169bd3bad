use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Search walked when no other base URL is configured
pub const DEFAULT_BASE_URL: &str =
    "https://www.bahamasrealty.com/listings/?status=Active,Pending,Active+Under+Contract,Closed,CNT,PCG";

/// Run parameters for a scrape
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Paginated search URLs to walk; one workbook is written per URL
    pub base_urls: Vec<String>,
    /// Newline-delimited file of listing URLs, bypassing the search walk
    pub url_file: Option<PathBuf>,
    /// Directory the workbooks are written into
    pub output_dir: PathBuf,
    /// Run Chrome without a visible window
    pub headless: bool,
    /// Look up coordinates for each listing address
    pub geocode: bool,
    /// Settle budget for a search results page
    pub page_settle: Duration,
    /// Settle budget for a listing detail page
    pub listing_settle: Duration,
    /// Budget for the map redirect to expose coordinates
    pub geocode_wait: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_urls: vec![DEFAULT_BASE_URL.to_string()],
            url_file: None,
            output_dir: PathBuf::from("output"),
            headless: true,
            geocode: true,
            page_settle: Duration::from_secs(5),
            listing_settle: Duration::from_secs(3),
            geocode_wait: Duration::from_secs(5),
        }
    }
}

impl ScrapeConfig {
    /// Defaults plus any `SCOUT_*` environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("SCOUT_BASE_URLS") {
            let urls: Vec<String> = raw
                .split(',')
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect();
            if !urls.is_empty() {
                config.base_urls = urls;
            }
        }

        if let Ok(path) = std::env::var("SCOUT_URL_FILE") {
            if !path.trim().is_empty() {
                config.url_file = Some(PathBuf::from(path));
            }
        }

        if let Ok(dir) = std::env::var("SCOUT_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                config.output_dir = PathBuf::from(dir);
            }
        }

        if flag_set("SCOUT_HEADFUL") {
            config.headless = false;
        }

        if flag_set("SCOUT_NO_GEOCODE") {
            config.geocode = false;
        }

        config
    }
}

fn flag_set(name: &str) -> bool {
    std::env::var(name).map(|value| value == "1").unwrap_or(false)
}

/// Read a newline-delimited listing URL file
///
/// Lines are trimmed; blank lines and `#` comments are skipped.
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file {}", path.display()))?;

    let urls: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        bail!("URL file {} contains no listing URLs", path.display());
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_walks_the_active_listings_search() {
        let config = ScrapeConfig::default();
        assert_eq!(config.base_urls, vec![DEFAULT_BASE_URL.to_string()]);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.headless);
        assert!(config.geocode);
        assert!(config.url_file.is_none());
        assert_eq!(config.page_settle, Duration::from_secs(5));
        assert_eq!(config.listing_settle, Duration::from_secs(3));
    }

    #[test]
    fn env_overrides_replace_the_defaults() {
        std::env::set_var("SCOUT_BASE_URLS", "https://a.example/?x=1, https://b.example/");
        std::env::set_var("SCOUT_URL_FILE", "saved.txt");
        std::env::set_var("SCOUT_OUTPUT_DIR", "exports");
        std::env::set_var("SCOUT_HEADFUL", "1");
        std::env::set_var("SCOUT_NO_GEOCODE", "1");

        let config = ScrapeConfig::from_env();

        std::env::remove_var("SCOUT_BASE_URLS");
        std::env::remove_var("SCOUT_URL_FILE");
        std::env::remove_var("SCOUT_OUTPUT_DIR");
        std::env::remove_var("SCOUT_HEADFUL");
        std::env::remove_var("SCOUT_NO_GEOCODE");

        assert_eq!(
            config.base_urls,
            vec![
                "https://a.example/?x=1".to_string(),
                "https://b.example/".to_string(),
            ]
        );
        assert_eq!(config.url_file, Some(PathBuf::from("saved.txt")));
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert!(!config.headless);
        assert!(!config.geocode);
    }

    #[test]
    fn url_file_skips_blanks_and_comments() {
        let path = std::env::temp_dir().join(format!(
            "listing-scout-urls-{}-skip.txt",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "# saved listings\n\nhttps://www.bahamasrealty.com/listing/1\n  https://www.bahamasrealty.com/listing/2  \n",
        )
        .unwrap();

        let urls = read_url_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            urls,
            vec![
                "https://www.bahamasrealty.com/listing/1".to_string(),
                "https://www.bahamasrealty.com/listing/2".to_string(),
            ]
        );
    }

    #[test]
    fn url_file_with_only_comments_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "listing-scout-urls-{}-empty.txt",
            std::process::id()
        ));
        std::fs::write(&path, "# nothing here\n\n").unwrap();

        let result = read_url_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn missing_url_file_is_an_error() {
        let path = Path::new("definitely-not-a-real-url-file.txt");
        assert!(read_url_file(path).is_err());
    }
}
