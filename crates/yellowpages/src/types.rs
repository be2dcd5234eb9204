use std::fmt::Display;

use serde::Serialize;

use crate::parser::AddressError;

/// One business found on a search results page.
///
/// Field order is the column order of the exported CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusinessListing {
    pub rank: Option<String>,
    pub business_name: Option<String>,
    pub telephone: Option<String>,
    pub business_page: Option<String>,
    pub category: Option<String>,
    pub website: Option<String>,
    pub rating: Option<String>,
    pub street: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub zipcode: Option<String>,
    /// Search results page the listing was found on.
    pub listing_url: String,
}

impl Display for BusinessListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "[{}] {} ({})",
            or_dash(&self.rank),
            or_dash(&self.business_name),
            or_dash(&self.telephone)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub place: String,
    pub max_pages: u32,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, place: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            place: place.into(),
            max_pages: crate::DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// `{keyword}-{place}-yellowpages-scraped-data.csv`
    pub fn output_filename(&self) -> String {
        format!("{}-{}-yellowpages-scraped-data.csv", self.keyword, self.place)
    }
}

/// Something in a listing that could not be extracted cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingWarning {
    AddressUnparsed {
        business_name: Option<String>,
        raw: String,
        error: AddressError,
    },
}

impl Display for ListingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingWarning::AddressUnparsed {
                business_name,
                raw,
                error,
            } => write!(
                f,
                "could not parse address {:?} of {}: {}",
                raw,
                business_name.as_deref().unwrap_or("unnamed listing"),
                error
            ),
        }
    }
}

/// A successfully fetched search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub page: u32,
    pub url: String,
    pub listings: Vec<BusinessListing>,
    pub warnings: Vec<ListingWarning>,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::new("pizza", "Springfield");
        assert_eq!(query.max_pages, 10);
        assert_eq!(query.with_max_pages(2).max_pages, 2);
    }

    #[test]
    fn test_output_filename() {
        let query = SearchQuery::new("dentists", "Boston, MA");
        assert_eq!(
            query.output_filename(),
            "dentists-Boston, MA-yellowpages-scraped-data.csv"
        );
    }

    #[test]
    fn test_listing_display_with_missing_fields() {
        let listing = BusinessListing {
            rank: Some("5".to_string()),
            business_name: Some("Route 66 Diner".to_string()),
            listing_url: "https://www.yellowpages.com/search?page=1".to_string(),
            ..Default::default()
        };
        assert_eq!(listing.to_string(), "[5] Route 66 Diner (-)");
    }
}
