use std::sync::Arc;
use tracing::info;

use crate::browser::{ChromiumLauncher, PageRenderer, PageSource};
use crate::config::Config;
use crate::error::{Result, ScrapingError};
use crate::parser::{ScrapeRequest, ScrapeResult};
use crate::sites::{host_of, match_site, supported_domains, PageExtractor, SiteExtractor, SiteKind};

/// Routes a scrape request to the extractor for its site.
pub struct Dispatcher {
    storefront: Arc<dyn SiteExtractor>,
    marketplace: Arc<dyn SiteExtractor>,
}

impl Dispatcher {
    pub fn new(storefront: Arc<dyn SiteExtractor>, marketplace: Arc<dyn SiteExtractor>) -> Self {
        Self { storefront, marketplace }
    }

    /// Both extractors render through headless Chromium.
    pub fn from_config(config: &Config) -> Result<Self> {
        let launcher = Arc::new(ChromiumLauncher::new(&config.browser));
        let renderer: Arc<dyn PageSource> = Arc::new(PageRenderer::new(launcher, &config.browser));

        let storefront = PageExtractor::storefront(renderer.clone(), &config.extraction)?;
        let marketplace = PageExtractor::marketplace(renderer)?;

        Ok(Self::new(Arc::new(storefront), Arc::new(marketplace)))
    }

    pub fn extractor(&self, kind: SiteKind) -> &Arc<dyn SiteExtractor> {
        match kind {
            SiteKind::Storefront => &self.storefront,
            SiteKind::Marketplace => &self.marketplace,
        }
    }

    /// `Err` only for requests that never reach an extractor: a missing url
    /// or an unsupported site. Extraction failures come back as `Ok` with
    /// `success = false`.
    pub async fn dispatch(&self, request: &ScrapeRequest) -> Result<ScrapeResult> {
        let url = request.target_url().ok_or(ScrapingError::MissingParameter)?;

        let domain = host_of(url);
        let rule = match_site(&domain).ok_or_else(|| ScrapingError::UnsupportedSite {
            domain: domain.clone(),
            supported: supported_domains().join(", "),
        })?;

        info!("Dispatching {} to {:?} extractor ({})", url, rule.kind, rule.domain);
        Ok(self.extractor(rule.kind).extract(url).await)
    }
}
