use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::ScrapingError;
use crate::parser::{element_text, selector, ImageList, ParsedProduct, ProductParser, UrlNormalizer};

const IMAGE_LIST_MARKER: &str = "imagePathList";

/// Parser for marketplace pages that ship the product gallery as a JSON
/// array inside an inline script instead of markup.
pub struct MarketplaceParser {
    heading_selector: Selector,
    script_selector: Selector,
    image_list_pattern: Regex,
    normalizer: UrlNormalizer,
}

impl MarketplaceParser {
    pub fn new() -> Result<Self, ScrapingError> {
        let image_list_pattern = Regex::new(r#""imagePathList"\s*:\s*(\[[^\]]+\])"#)
            .map_err(|e| ScrapingError::ParseError(format!("Invalid image list pattern: {}", e)))?;

        Ok(Self {
            heading_selector: selector("h1")?,
            script_selector: selector("script")?,
            image_list_pattern,
            normalizer: UrlNormalizer::scheme_only(),
        })
    }

    // first script whose image list parses wins; broken candidates are skipped
    fn extract_images(&self, document: &Html) -> ImageList {
        let mut images = ImageList::new();

        for script in document.select(&self.script_selector) {
            let body = script.text().collect::<String>();
            if !body.contains(IMAGE_LIST_MARKER) {
                continue;
            }

            let Some(captures) = self.image_list_pattern.captures(&body) else {
                debug!("Script mentions {} but has no array value", IMAGE_LIST_MARKER);
                continue;
            };

            match serde_json::from_str::<Vec<String>>(&captures[1]) {
                Ok(paths) => {
                    images.extend(paths.iter().filter_map(|path| self.normalizer.normalize(path)));
                    break;
                }
                Err(e) => {
                    debug!("Skipping malformed {} in script: {}", IMAGE_LIST_MARKER, e);
                }
            }
        }

        images
    }
}

impl ProductParser for MarketplaceParser {
    fn parse_product_html(&self, html: &str) -> ParsedProduct {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.heading_selector)
            .next()
            .map(|heading| element_text(&heading))
            .unwrap_or_default();

        let images = self.extract_images(&document);

        debug!("Marketplace page parsed: title={:?}, {} images", title, images.len());
        ParsedProduct {
            title,
            images: images.into_vec(),
        }
    }
}
