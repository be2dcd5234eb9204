pub mod export;
mod parser;
pub mod report;
pub mod scraper;
pub mod selector;
pub mod types;

pub use parser::{Address, AddressError, parse_address, parse_listing, parse_listings};
pub use report::{LogReporter, MemoryReporter, Reporter, ScrapeEvent};
pub use scraper::{ScraperError, WebScraper};

pub const BASE_URL: &str = "https://www.yellowpages.com";

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/64.0.3282.140 Safari/537.36";

pub const DEFAULT_MAX_PAGES: u32 = 10;
