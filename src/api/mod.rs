pub mod home;

#[cfg(test)]
mod tests;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, ScrapingError};
use crate::parser::{ScrapeRequest, ScrapeResult};
use crate::sites::Dispatcher;

/// Everything except a missing `url` is reported with 200 and
/// `success = false` in the body.
impl IntoResponse for ScrapingError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        (status, Json(ScrapeResult::failure(self.to_string()))).into_response()
    }
}

pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", get(home::service_info))
        .route("/scrape", get(scrape_from_query).post(scrape_from_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(dispatcher)
}

pub async fn start_api_server(dispatcher: Arc<Dispatcher>, config: Arc<Config>) -> Result<()> {
    let app = create_router(dispatcher);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ScrapingError::ConfigError(format!("Failed to bind {}: {}", addr, e)))?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ScrapingError::ConfigError(format!("API server error: {}", e)))?;

    Ok(())
}

async fn scrape_from_query(
    State(dispatcher): State<Arc<Dispatcher>>,
    RawQuery(query): RawQuery,
) -> Response {
    run_scrape(&dispatcher, ScrapeRequest::from_query(query.as_deref())).await
}

// an unreadable or oversized body is treated like a missing url
async fn scrape_from_body(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let request = match body {
        Ok(body) => serde_json::from_slice::<ScrapeRequest>(&body).unwrap_or_else(|e| {
            debug!("Ignoring unreadable scrape body: {}", e);
            ScrapeRequest::default()
        }),
        Err(rejection) => {
            debug!("Rejected scrape body: {}", rejection);
            ScrapeRequest::default()
        }
    };
    run_scrape(&dispatcher, request).await
}

async fn run_scrape(dispatcher: &Dispatcher, request: ScrapeRequest) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "scrape",
        %request_id,
        url = request.target_url().unwrap_or_default()
    );

    async move {
        match dispatcher.dispatch(&request).await {
            Ok(result) => {
                info!(success = result.success, images = result.images.len(), "Scrape finished");
                (StatusCode::OK, Json(result)).into_response()
            }
            Err(e) => {
                info!("Scrape rejected: {}", e);
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}
