pub mod dispatcher;
pub mod extractor;

pub use dispatcher::Dispatcher;
pub use extractor::PageExtractor;

use async_trait::async_trait;
use url::Url;

use crate::parser::ScrapeResult;

/// Page layout family a supported site is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    /// Theme markup with title and gallery marker classes.
    Storefront,
    /// Image list embedded as JSON in an inline script.
    Marketplace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteRule {
    pub domain: &'static str,
    pub kind: SiteKind,
    /// Origin that root-relative asset paths resolve against.
    pub origin: &'static str,
}

pub static SITE_RULES: [SiteRule; 2] = [
    SiteRule {
        domain: "aliexpress.com",
        kind: SiteKind::Marketplace,
        origin: "https://www.aliexpress.com",
    },
    SiteRule {
        domain: "thepillowhome.com",
        kind: SiteKind::Storefront,
        origin: "https://thepillowhome.com",
    },
];

/// First rule whose domain is contained in the lower-cased host.
pub fn match_site(host: &str) -> Option<&'static SiteRule> {
    let host = host.to_lowercase();
    SITE_RULES.iter().find(|rule| host.contains(rule.domain))
}

pub fn rule_for(kind: SiteKind) -> &'static SiteRule {
    match kind {
        SiteKind::Marketplace => &SITE_RULES[0],
        SiteKind::Storefront => &SITE_RULES[1],
    }
}

pub fn supported_domains() -> Vec<&'static str> {
    SITE_RULES.iter().map(|rule| rule.domain).collect()
}

/// Lower-cased host of `url`, or an empty string when it has none.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Scrapes one product page into a result. Failures are folded into the
/// returned value, never propagated.
#[async_trait]
pub trait SiteExtractor: Send + Sync {
    fn kind(&self) -> SiteKind;
    async fn extract(&self, url: &str) -> ScrapeResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_site_by_substring() {
        assert_eq!(match_site("www.aliexpress.com").map(|r| r.kind), Some(SiteKind::Marketplace));
        assert_eq!(match_site("es.aliexpress.com").map(|r| r.kind), Some(SiteKind::Marketplace));
        assert_eq!(match_site("THEPILLOWHOME.COM").map(|r| r.kind), Some(SiteKind::Storefront));
        assert_eq!(match_site("shop.thepillowhome.com").map(|r| r.kind), Some(SiteKind::Storefront));
        assert!(match_site("www.amazon.com").is_none());
        assert!(match_site("").is_none());
    }

    #[test]
    fn test_rule_for_kind() {
        assert_eq!(rule_for(SiteKind::Storefront).domain, "thepillowhome.com");
        assert_eq!(rule_for(SiteKind::Marketplace).domain, "aliexpress.com");
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://WWW.AliExpress.com/item/1005008988478906.html"), "www.aliexpress.com");
        assert_eq!(host_of("https://thepillowhome.com:8443/products/x?variant=1"), "thepillowhome.com");
        assert_eq!(host_of("thepillowhome.com/products/x"), "");
        assert_eq!(host_of("not a url"), "");
    }

    #[test]
    fn test_supported_domains() {
        assert_eq!(supported_domains(), vec!["aliexpress.com", "thepillowhome.com"]);
    }
}
