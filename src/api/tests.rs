use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use crate::api::create_router;
use crate::parser::{ParsedProduct, ScrapeResult};
use crate::sites::{Dispatcher, SiteExtractor, SiteKind};

struct CannedExtractor {
    kind: SiteKind,
    result: ScrapeResult,
    calls: AtomicUsize,
}

impl CannedExtractor {
    fn new(kind: SiteKind, result: ScrapeResult) -> Arc<Self> {
        Arc::new(Self {
            kind,
            result,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SiteExtractor for CannedExtractor {
    fn kind(&self) -> SiteKind {
        self.kind
    }

    async fn extract(&self, _url: &str) -> ScrapeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct TestApp {
    router: Router,
    storefront: Arc<CannedExtractor>,
    marketplace: Arc<CannedExtractor>,
}

fn app() -> TestApp {
    let storefront = CannedExtractor::new(
        SiteKind::Storefront,
        ScrapeResult::success(ParsedProduct {
            title: "Cooling Gel Pillow".to_string(),
            images: vec!["https://thepillowhome.com/cdn/shop/products/gel.jpg".to_string()],
        }),
    );
    let marketplace = CannedExtractor::new(
        SiteKind::Marketplace,
        ScrapeResult::failure("Navigation to https://www.aliexpress.com/item/1.html timed out after 30000ms"),
    );
    let dispatcher = Arc::new(Dispatcher::new(storefront.clone(), marketplace.clone()));

    TestApp {
        router: create_router(dispatcher),
        storefront,
        marketplace,
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_home_describes_service() {
    let (status, json) = send(app().router, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["supported_sites"], serde_json::json!(["aliexpress.com", "thepillowhome.com"]));
    assert!(json["example"]["url"].as_str().unwrap().contains("aliexpress.com"));
}

#[tokio::test]
async fn test_get_scrape_success() {
    let app = app();
    let (status, json) = send(
        app.router,
        get("/scrape?url=https%3A%2F%2Fthepillowhome.com%2Fproducts%2Fgel"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["title"], "Cooling Gel Pillow");
    assert_eq!(json["images"][0], "https://thepillowhome.com/cdn/shop/products/gel.jpg");
    assert!(json.get("error").is_none());
    assert_eq!(app.storefront.calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.marketplace.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_post_scrape_uses_json_body() {
    let app = app();
    let (status, json) = send(
        app.router,
        post_json(r#"{"url": "https://thepillowhome.com/products/gel"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(app.storefront.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let requests = vec![
        get("/scrape"),
        get("/scrape?url="),
        post_json("{}"),
        post_json("not json at all"),
        post_json(r#"{"url": 42}"#),
    ];

    for request in requests {
        let app = app();
        let (status, json) = send(app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("url"));
        assert_eq!(app.storefront.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.marketplace.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_unsupported_site_is_ok_with_failure_body() {
    let app = app();
    let (status, json) = send(app.router, get("/scrape?url=https://www.ebay.com/itm/123")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["title"], "");
    assert_eq!(json["images"], serde_json::json!([]));
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("www.ebay.com"));
    assert!(error.contains("aliexpress.com"));
    assert!(error.contains("thepillowhome.com"));
}

#[tokio::test]
async fn test_extraction_failure_is_ok_with_failure_body() {
    let app = app();
    let (status, json) = send(
        app.router,
        post_json(r#"{"url": "https://www.aliexpress.com/item/1.html"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("timed out"));
    assert_eq!(app.marketplace.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_url_uses_first_value() {
    let app = app();
    let (status, json) = send(
        app.router,
        get("/scrape?url=https://thepillowhome.com/a&url=https://www.aliexpress.com/item/1.html"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(app.storefront.calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.marketplace.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_body_still_answers_json() {
    let app = app();
    let padding = "x".repeat(3 * 1024 * 1024);
    let body = format!(r#"{{"url": "https://thepillowhome.com/a", "padding": "{}"}}"#, padding);

    let (status, json) = send(app.router, post_json(&body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("url"));
    assert_eq!(app.storefront.calls.load(Ordering::SeqCst), 0);
}
