use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::selector::{
    Capture, FieldQuery, clean_locality, clean_rank, clean_rating, join_categories, joined,
};
use crate::types::{BusinessListing, ListingPage, ListingWarning};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("no comma between locality and region in '{0}'")]
    MissingComma(String),
    #[error("expected '<locality>, <region> <zipcode>' but got '{0}'")]
    UnexpectedShape(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub locality: String,
    pub region: String,
    pub zipcode: String,
}

static LISTING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div[class='search-results organic'] div[class='v-card']")
        .expect("invalid selector: listing")
});

fn query(css: &str, capture: Capture) -> FieldQuery {
    FieldQuery::new(css, capture).expect("invalid selector: listing field")
}

static BUSINESS_NAME: LazyLock<FieldQuery> =
    LazyLock::new(|| query("a[class='business-name']", Capture::Text));

static BUSINESS_PAGE: LazyLock<FieldQuery> =
    LazyLock::new(|| query("a[class='business-name']", Capture::Attr("href")));

static TELEPHONE: LazyLock<FieldQuery> =
    LazyLock::new(|| query("div[class='phones phone primary']", Capture::Text));

static STREET: LazyLock<FieldQuery> =
    LazyLock::new(|| query("div[class='street-address']", Capture::Text));

static LOCALITY: LazyLock<FieldQuery> =
    LazyLock::new(|| query("div[class='locality']", Capture::Text));

static RANK: LazyLock<FieldQuery> =
    LazyLock::new(|| query("div[class='info'] h2[class='n']", Capture::OwnText));

static CATEGORIES: LazyLock<FieldQuery> = LazyLock::new(|| {
    query(
        "div[class='info'] div[class*='info-section'] div[class='categories']",
        Capture::Text,
    )
});

static WEBSITE: LazyLock<FieldQuery> = LazyLock::new(|| {
    query(
        "div[class='info'] div[class*='info-section'] div[class='links'] a[class*='website']",
        Capture::Attr("href"),
    )
});

static RATING: LazyLock<FieldQuery> = LazyLock::new(|| {
    query(
        "div[class='info'] div[class*='info-section'] div[class*='result-rating'] span",
        Capture::Text,
    )
});

/// Splits `"<locality>, <region> <zipcode>"`.
///
/// Everything before the first comma is the locality. The rest is split on
/// single spaces and must give exactly three tokens; the first one (the
/// blank left after the comma) is dropped.
pub fn parse_address(raw: &str) -> Result<Address, AddressError> {
    let (locality, rest) = raw
        .split_once(',')
        .ok_or_else(|| AddressError::MissingComma(raw.to_string()))?;

    let tokens: Vec<&str> = rest.split(' ').collect();
    let [_, region, zipcode] = tokens.as_slice() else {
        return Err(AddressError::UnexpectedShape(raw.to_string()));
    };
    if region.is_empty() || zipcode.is_empty() {
        return Err(AddressError::UnexpectedShape(raw.to_string()));
    }

    Ok(Address {
        locality: locality.trim().to_string(),
        region: region.to_string(),
        zipcode: zipcode.to_string(),
    })
}

/// Resolves each captured href against `base` on its own.
fn absolutize(base: &Url, hrefs: Vec<String>) -> Vec<String> {
    hrefs
        .into_iter()
        .map(|href| match base.join(href.trim()) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::debug!("Keeping unresolvable link '{}': {}", href, e);
                href
            }
        })
        .collect()
}

/// Extracts one listing node. `page_url` becomes `listing_url`; relative
/// links are resolved against `base`.
pub fn parse_listing(
    node: ElementRef,
    page_url: &str,
    base: &Url,
) -> (BusinessListing, Option<ListingWarning>) {
    let business_name = joined(&BUSINESS_NAME.fragments(node));
    let raw_locality = clean_locality(&LOCALITY.fragments(node));

    let (address, warning) = match raw_locality {
        None => (None, None),
        Some(raw) => match parse_address(&raw) {
            Ok(address) => (Some(address), None),
            Err(error) => (
                None,
                Some(ListingWarning::AddressUnparsed {
                    business_name: business_name.clone(),
                    raw,
                    error,
                }),
            ),
        },
    };
    let (locality, region, zipcode) = match address {
        Some(a) => (Some(a.locality), Some(a.region), Some(a.zipcode)),
        None => (None, None, None),
    };

    let listing = BusinessListing {
        rank: clean_rank(&RANK.fragments(node)),
        business_name,
        telephone: joined(&TELEPHONE.fragments(node)),
        business_page: joined(&absolutize(base, BUSINESS_PAGE.fragments(node))),
        category: join_categories(&CATEGORIES.fragments(node)),
        website: joined(&absolutize(base, WEBSITE.fragments(node))),
        rating: clean_rating(&RATING.fragments(node)),
        street: joined(&STREET.fragments(node)),
        locality,
        region,
        zipcode,
        listing_url: page_url.to_string(),
    };

    (listing, warning)
}

/// Extracts every listing on a search results page, in document order.
pub fn parse_listings(html: &str, page: u32, page_url: &str, base: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let mut listings = Vec::new();
    let mut warnings = Vec::new();

    for node in document.select(&LISTING) {
        let (listing, warning) = parse_listing(node, page_url, base);
        log::trace!("{}", listing);
        listings.push(listing);
        warnings.extend(warning);
    }

    log::debug!("Parsed {} listing(s) from {}", listings.len(), page_url);

    ListingPage {
        page,
        url: page_url.to_string(),
        listings,
        warnings,
    }
}
