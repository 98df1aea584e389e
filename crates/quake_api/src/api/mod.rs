//! HTTP API handlers.

pub mod checklist;
pub mod earthquakes;
pub mod error;
pub mod health;

pub use checklist::download_checklist;
pub use earthquakes::{earthquake_stats, list_earthquakes};
pub use error::ApiError;
pub use health::health_routes;
