use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapingError};

/// Turns raw `src` values into absolute image URLs.
///
/// Protocol-relative values (`//cdn/...`) get an `https:` prefix. With a base
/// origin, root-relative values (`/files/...`) are appended to it and any
/// other relative value is joined onto it. Every returned value parses as an
/// absolute URL, so normalizing a second time is a no-op.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    base: Option<Url>,
}

impl UrlNormalizer {
    pub fn with_base(origin: &str) -> Result<Self> {
        let base = Url::parse(origin)
            .map_err(|e| ScrapingError::ParseError(format!("Invalid base origin '{}': {}", origin, e)))?;
        Ok(Self { base: Some(base) })
    }

    pub fn scheme_only() -> Self {
        Self { base: None }
    }

    pub fn normalize(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let candidate = if raw.starts_with("//") {
            format!("https:{}", raw)
        } else if raw.starts_with('/') {
            let base = self.base.as_ref()?;
            format!("{}{}", base.origin().ascii_serialization(), raw)
        } else if Url::parse(raw).is_ok() {
            return Some(raw.to_string());
        } else {
            let joined = self.base.as_ref()?.join(raw).ok()?;
            return Some(joined.to_string());
        };

        match Url::parse(&candidate) {
            Ok(_) => Some(candidate),
            Err(e) => {
                debug!("Dropping image url '{}': {}", raw, e);
                None
            }
        }
    }
}

/// Image urls in discovery order, without duplicates.
#[derive(Debug, Default)]
pub struct ImageList {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl ImageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the url was already collected.
    pub fn push(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

impl Extend<String> for ImageList {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for url in iter {
            self.push(url);
        }
    }
}
