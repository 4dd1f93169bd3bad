pub mod bahamas;
pub mod browser;
pub mod traits;
pub mod types;

pub use bahamas::BahamasRealtyScraper;
pub use browser::BrowserSession;
pub use traits::ListingScraper;
pub use types::{read_url_file, ScrapeConfig};
