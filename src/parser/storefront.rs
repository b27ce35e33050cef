use scraper::{Html, Selector};
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::error::ScrapingError;
use crate::parser::{element_text, image_source, selector, ImageList, ParsedProduct, ProductParser, UrlNormalizer};

/// Parser for pages built on the common storefront theme markup: a
/// `product__title` heading and `product__media` gallery containers.
pub struct StorefrontParser {
    title_selector: Selector,
    heading_selector: Selector,
    gallery_selector: Selector,
    legacy_gallery_selector: Selector,
    image_selector: Selector,
    normalizer: UrlNormalizer,
    fallback_limit: usize,
    fallback_keyword: String,
}

impl StorefrontParser {
    pub fn new(base_origin: &str, settings: &ExtractionConfig) -> Result<Self, ScrapingError> {
        Ok(Self {
            title_selector: selector("h1.product__title")?,
            heading_selector: selector("h1")?,
            gallery_selector: selector("div.product__media")?,
            legacy_gallery_selector: selector("div.product-single__photos")?,
            image_selector: selector("img")?,
            normalizer: UrlNormalizer::with_base(base_origin)?,
            fallback_limit: settings.fallback_image_limit,
            fallback_keyword: settings.fallback_keyword.to_lowercase(),
        })
    }

    fn extract_title(&self, document: &Html) -> String {
        document
            .select(&self.title_selector)
            .next()
            .or_else(|| document.select(&self.heading_selector).next())
            .map(|heading| element_text(&heading))
            .unwrap_or_default()
    }

    fn extract_gallery_images(&self, document: &Html, images: &mut ImageList) {
        let mut containers: Vec<_> = document.select(&self.gallery_selector).collect();
        if containers.is_empty() {
            containers = document.select(&self.legacy_gallery_selector).collect();
        }

        for container in containers {
            let sources = container
                .select(&self.image_selector)
                .filter_map(|img| image_source(&img))
                .filter_map(|src| self.normalizer.normalize(src));
            images.extend(sources);
        }
    }

    // generic scan over the first few page images
    fn extract_fallback_images(&self, document: &Html, images: &mut ImageList) {
        let sources = document
            .select(&self.image_selector)
            .take(self.fallback_limit)
            .filter_map(|img| image_source(&img))
            .filter(|src| src.to_lowercase().contains(&self.fallback_keyword))
            .filter_map(|src| self.normalizer.normalize(src));
        images.extend(sources);
    }
}

impl ProductParser for StorefrontParser {
    fn parse_product_html(&self, html: &str) -> ParsedProduct {
        let document = Html::parse_document(html);

        let title = self.extract_title(&document);

        let mut images = ImageList::new();
        self.extract_gallery_images(&document, &mut images);
        if images.is_empty() {
            debug!("No gallery images found, falling back to generic image scan");
            self.extract_fallback_images(&document, &mut images);
        }

        debug!("Storefront page parsed: title={:?}, {} images", title, images.len());
        ParsedProduct {
            title,
            images: images.into_vec(),
        }
    }
}
