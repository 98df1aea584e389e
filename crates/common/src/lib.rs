//! Shared types, config, and error definitions for quake-feed.

pub mod config;
pub mod error;
pub mod geofence;
pub mod source;
pub mod time_ago;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use geofence::{in_region, GeoFence, KANDILLI_REGION};
pub use source::{EarthquakeSource, SourceFetch};
pub use time_ago::{time_ago, Locale};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
