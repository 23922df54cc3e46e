pub mod cache;
pub mod config;
pub mod layout;
pub mod parser;
pub mod scraper;
pub mod types;
pub mod utils;
pub mod xlsx;

pub use scraper::{PageSource, ScraperError, WebScraper, collect_pages};
