//! Banner, health, version and echo endpoints.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub environment: String,
    pub health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub env: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct EchoQuery {
    #[serde(default = "default_echo")]
    pub q: String,
}

fn default_echo() -> String {
    "hello".to_string()
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub echo: String,
}

/// GET /
pub async fn banner(State(state): State<AppState>) -> Json<BannerResponse> {
    Json(BannerResponse {
        message: format!("{} earthquake API", state.config.app_name),
        version: state.config.app_version.clone(),
        environment: state.config.app_env.clone(),
        health: "/health",
    })
}

/// GET /health and GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        env: state.config.app_env.clone(),
        service: state.config.app_name.clone(),
    })
}

/// GET /version
pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.config.app_version.clone(),
    })
}

/// GET /api/echo?q=
pub async fn echo(Query(params): Query<EchoQuery>) -> Json<EchoResponse> {
    Json(EchoResponse { echo: params.q })
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .route("/version", get(version))
        .route("/api/echo", get(echo))
}
