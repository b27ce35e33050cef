use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Incoming scrape parameters, from the query string or a JSON body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapeRequest {
    pub url: Option<String>,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()) }
    }

    /// Reads `url` from a raw query string. When the key repeats, the first
    /// value wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let url = query.and_then(|query| {
            form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        });
        Self { url }
    }

    /// The requested url, or `None` when absent or blank.
    pub fn target_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Title and images pulled from one rendered product page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProduct {
    pub title: String,
    pub images: Vec<String>,
}

/// Response body of `/scrape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub success: bool,
    pub title: String,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResult {
    pub fn success(product: ParsedProduct) -> Self {
        Self {
            success: true,
            title: product.title,
            images: product.images,
            error: None,
        }
    }

    /// A failed result never carries partial data.
    pub fn failure(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Unknown scraping error".to_string();
        }

        Self {
            success: false,
            title: String::new(),
            images: Vec::new(),
            error: Some(message),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        match (&self.success, &self.error) {
            (true, None) => true,
            (false, Some(error)) => !error.is_empty() && self.title.is_empty() && self.images.is_empty(),
            _ => false,
        }
    }
}
