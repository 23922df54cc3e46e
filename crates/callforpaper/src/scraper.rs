use crate::cache::{CacheError, ResponseCache};
use crate::config::ScrapeConfig;
use crate::parser::{ParseError, parse_ccf_page};
use crate::types::{AggregationModel, PageResult};

use reqwest::blocking::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Where listing pages come from. Non-200 statuses are returned as responses,
/// not errors; only transport failures are `Err`.
pub trait PageSource {
    fn get(&self, url: &str) -> Result<RawResponse, ScraperError>;

    fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.get(url)?;
        if !response.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

#[derive(Debug)]
pub struct WebScraper {
    client: Client,
    cache: Option<ResponseCache>,
}

impl WebScraper {
    pub fn new(cache: Option<ResponseCache>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client, cache })
    }

    fn get_uncached(&self, url: &str) -> Result<RawResponse, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?;
        Ok(RawResponse { status, body })
    }
}

impl PageSource for WebScraper {
    fn get(&self, url: &str) -> Result<RawResponse, ScraperError> {
        if let Some(cache) = &self.cache
            && let Some(cached) = cache.get(url)?
        {
            log::debug!("Cache hit for {} (fetched {})", url, cached.fetched_at);
            return Ok(RawResponse {
                status: cached.status,
                body: cached.body,
            });
        }

        let response = self.get_uncached(url)?;
        if let Some(cache) = &self.cache
            && response.is_success()
        {
            cache.put(url, response.status, &response.body)?;
        }
        Ok(response)
    }
}

pub fn fetch_page<S: PageSource + ?Sized>(
    source: &S,
    url: &str,
    config: &ScrapeConfig,
) -> Result<PageResult, ScraperError> {
    let html = source.fetch_html(url)?;
    Ok(parse_ccf_page(&html, url, config.parse_options())?)
}

/// Fetches and extracts every listing page in index order.
///
/// A page that fails at any step is logged and left out of the model; the
/// remaining indices are still processed.
pub fn collect_pages<S: PageSource + ?Sized>(
    source: &S,
    config: &ScrapeConfig,
) -> AggregationModel {
    let mut model = AggregationModel::new();

    for (index, url) in config.page_urls() {
        log::info!("Fetching page {}/{}: {}", index, config.page_count, url);
        match fetch_page(source, &url, config) {
            Ok(page) => {
                log::info!(
                    "Page {}: '{}' with {} conference(s) and {} journal(s)",
                    index,
                    page.field,
                    page.conference_count(),
                    page.journal_count()
                );
                model.push(page);
            }
            Err(e) => log::warn!("Skipping page {}: {}", index, e),
        }
    }

    model
}
