use axum::Json;
use serde::Serialize;

use crate::sites::supported_domains;

const EXAMPLE_URL: &str = "https://www.aliexpress.com/item/1005008988478906.html";

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub supported_sites: Vec<&'static str>,
    pub usage: &'static str,
    pub example: UsageExample,
}

#[derive(Debug, Serialize)]
pub struct UsageExample {
    pub url: &'static str,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            message: "Multi-site scraper running",
            supported_sites: supported_domains(),
            usage: "GET or POST /scrape with a url parameter",
            example: UsageExample { url: EXAMPLE_URL },
        }
    }
}

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}
