pub mod marketplace;
pub mod normalize;
pub mod product;
pub mod storefront;

pub use marketplace::MarketplaceParser;
pub use normalize::{ImageList, UrlNormalizer};
pub use product::*;
pub use storefront::StorefrontParser;

use scraper::{ElementRef, Selector};

use crate::error::ScrapingError;

/// Site-specific heuristics turning rendered HTML into a product record.
///
/// Parsing never fails: missing markup yields empty fields.
pub trait ProductParser: Send + Sync {
    fn parse_product_html(&self, html: &str) -> ParsedProduct;
}

pub(crate) fn selector(css: &str) -> Result<Selector, ScrapingError> {
    Selector::parse(css).map_err(|e| ScrapingError::ParseError(format!("Invalid selector '{}': {}", css, e)))
}

// whitespace-collapsed text of an element
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// `src`, or `data-src` for lazy-loaded images.
pub(crate) fn image_source<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    let attrs = element.value();
    attrs
        .attr("src")
        .filter(|src| !src.trim().is_empty())
        .or_else(|| attrs.attr("data-src").filter(|src| !src.trim().is_empty()))
}
