use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::browser::PageSource;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::parser::{MarketplaceParser, ProductParser, ScrapeResult, StorefrontParser};
use crate::sites::{rule_for, SiteExtractor, SiteKind};

/// Render the page, then hand the HTML to a site parser.
pub struct PageExtractor<P> {
    kind: SiteKind,
    source: Arc<dyn PageSource>,
    parser: P,
}

impl<P: ProductParser> PageExtractor<P> {
    pub fn new(kind: SiteKind, source: Arc<dyn PageSource>, parser: P) -> Self {
        Self { kind, source, parser }
    }
}

impl PageExtractor<StorefrontParser> {
    pub fn storefront(source: Arc<dyn PageSource>, settings: &ExtractionConfig) -> Result<Self> {
        let parser = StorefrontParser::new(rule_for(SiteKind::Storefront).origin, settings)?;
        Ok(Self::new(SiteKind::Storefront, source, parser))
    }
}

impl PageExtractor<MarketplaceParser> {
    pub fn marketplace(source: Arc<dyn PageSource>) -> Result<Self> {
        Ok(Self::new(SiteKind::Marketplace, source, MarketplaceParser::new()?))
    }
}

#[async_trait]
impl<P: ProductParser> SiteExtractor for PageExtractor<P> {
    fn kind(&self) -> SiteKind {
        self.kind
    }

    async fn extract(&self, url: &str) -> ScrapeResult {
        match self.source.fetch_html(url).await {
            Ok(html) => {
                let product = self.parser.parse_product_html(&html);
                info!(
                    "Extracted {:?} page {}: {} images, title found: {}",
                    self.kind,
                    url,
                    product.images.len(),
                    !product.title.is_empty()
                );
                ScrapeResult::success(product)
            }
            Err(e) => {
                warn!("Failed to scrape {:?} page {}: {}", self.kind, url, e);
                ScrapeResult::failure(e.to_string())
            }
        }
    }
}
