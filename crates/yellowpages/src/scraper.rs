use std::pin::pin;
use std::time::Duration;

use futures::{Stream, StreamExt, stream};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::parser::parse_listings;
use crate::report::{Reporter, ScrapeEvent};
use crate::types::{BusinessListing, ListingPage, SearchQuery};

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("HTTP status {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ScraperError {
    /// Status code of the response that caused the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScraperError::Status { status, .. } => Some(status.as_u16()),
            ScraperError::HttpError(e) => e.status().map(|s| s.as_u16()),
            ScraperError::InvalidUrl(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: Url,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_base_url(crate::BASE_URL)
    }

    /// Scraper against another host, e.g. a mirror or a local test server.
    /// Relative links in listings resolve against `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(crate::USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn search_url(&self, query: &SearchQuery, page: u32) -> Result<Url, ScraperError> {
        let mut url = self.base_url.join("/search")?;
        url.query_pairs_mut()
            .append_pair("search_terms", &query.keyword)
            .append_pair("geo_location_terms", &query.place)
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Fetches and parses a single results page.
    pub async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<ListingPage, ScraperError> {
        let url = self.search_url(query, page)?;
        self.fetch(page, url).await
    }

    /// Results pages `1..=query.max_pages`, fetched one at a time as the
    /// stream is polled.
    ///
    /// The stream ends early on the first page with no listings, the first
    /// non-200 response, or the first transport error. Nothing is requested
    /// after it ends.
    pub fn pages<'a, R>(
        &'a self,
        query: &'a SearchQuery,
        reporter: &'a R,
    ) -> impl Stream<Item = ListingPage> + 'a
    where
        R: Reporter + ?Sized,
    {
        stream::unfold(1u32, move |page| async move {
            if page > query.max_pages {
                return None;
            }

            let url = match self.search_url(query, page) {
                Ok(url) => url,
                Err(e) => {
                    reporter.report(ScrapeEvent::PageFailed {
                        page,
                        status: None,
                        reason: e.to_string(),
                    });
                    return None;
                }
            };
            reporter.report(ScrapeEvent::PageRequested {
                page,
                url: url.to_string(),
            });

            match self.fetch(page, url).await {
                Ok(listing_page) if listing_page.is_empty() => {
                    reporter.report(ScrapeEvent::NoMoreListings { page });
                    None
                }
                Ok(listing_page) => {
                    for warning in &listing_page.warnings {
                        reporter.report(ScrapeEvent::AddressUnparsed {
                            page,
                            detail: warning.to_string(),
                        });
                    }
                    reporter.report(ScrapeEvent::PageScraped {
                        page,
                        listings: listing_page.listings.len(),
                    });
                    Some((listing_page, page + 1))
                }
                Err(e) => {
                    reporter.report(ScrapeEvent::PageFailed {
                        page,
                        status: e.status(),
                        reason: e.to_string(),
                    });
                    None
                }
            }
        })
    }

    /// Every listing gathered before pagination stopped, possibly none.
    pub async fn scrape<R>(&self, query: &SearchQuery, reporter: &R) -> Vec<BusinessListing>
    where
        R: Reporter + ?Sized,
    {
        let mut pages = pin!(self.pages(query, reporter));
        let mut listings = Vec::new();
        while let Some(page) = pages.next().await {
            listings.extend(page.listings);
        }
        listings
    }

    async fn fetch(&self, page: u32, url: Url) -> Result<ListingPage, ScraperError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .inspect_err(|e| log::debug!("HTTP error: {e:?}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScraperError::Status {
                status,
                url: url.to_string(),
            });
        }

        let page_url = response.url().to_string();
        let html = response
            .text()
            .await
            .inspect_err(|e| log::debug!("Decode error: {e:?}"))?;

        Ok(parse_listings(&html, page, &page_url, &self.base_url))
    }
}
