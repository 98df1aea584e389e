//! HTTP surface for quake-feed.
//!
//! Exposes the aggregated earthquake feed, its 24-hour stats, health probes,
//! and the first-aid checklist download.

use std::sync::Arc;

use aggregator::QuakeService;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use common::AppConfig;
use kandilli_client::KandilliClient;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;
use usgs_client::UsgsClient;

pub mod api;

/// The service wired to the production upstream clients.
pub type FeedService = QuakeService<KandilliClient, UsgsClient>;

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FeedService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service: FeedService, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    let router = Router::new()
        .route("/api/earthquakes", get(api::list_earthquakes))
        .route("/api/earthquakes/stats", get(api::earthquake_stats))
        .route("/api/pdf/first-aid-checklist", get(api::download_checklist))
        .merge(api::health_routes())
        .with_state(state);

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

/// CORS policy for the configured origins; `None` when no origin is allowed.
///
/// A lone `*` opens the API to any origin without credentials.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    if origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    // Credentials rule out wildcards, so methods and headers are mirrored.
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_selection() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["*".to_string()]).is_some());
        assert!(cors_layer(&["https://example.org".to_string()]).is_some());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
    }
}
