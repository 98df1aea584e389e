//! Unified error type for quake-feed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Kandilli feed error: {0}")]
    Kandilli(String),

    #[error("USGS catalog error: {0}")]
    Usgs(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Aggregation pipeline failed: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
