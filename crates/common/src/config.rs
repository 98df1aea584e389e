//! Service configuration types.

use serde::{Deserialize, Serialize};

use crate::{Locale, SourceMode};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service name reported by the health endpoints.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployment environment label (dev, staging, prod).
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Version string reported by `/version`.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream endpoints and timeouts.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Query defaults applied when a caller omits parameters.
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Allowed CORS origins. Empty disables the CORS layer.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Path of the first-aid checklist PDF served for download.
    #[serde(default = "default_checklist_path")]
    pub checklist_pdf_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Kandilli live feed URL.
    #[serde(default = "default_kandilli_url")]
    pub kandilli_url: String,

    /// USGS FDSN event query URL.
    #[serde(default = "default_usgs_url")]
    pub usgs_url: String,

    /// Per-call upstream timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent sent to both upstreams.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime from insertion.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Mode used when the caller does not pick a source.
    #[serde(default)]
    pub default_mode: SourceMode,

    /// Language of the relative time strings.
    #[serde(default)]
    pub locale: Locale,

    #[serde(default = "default_hours_back")]
    pub default_hours_back: u32,

    #[serde(default = "default_min_magnitude")]
    pub default_min_magnitude: f64,

    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

// ── Default value functions ───────────────────────────────────────────

fn default_app_name() -> String {
    "quake-feed".into()
}
fn default_app_env() -> String {
    "dev".into()
}
fn default_app_version() -> String {
    "0.1.0".into()
}
fn default_bind_addr() -> String {
    "0.0.0.0:8000".into()
}
fn default_checklist_path() -> String {
    "checklist.pdf".into()
}
fn default_kandilli_url() -> String {
    "https://api.orhanaydogdu.com.tr/deprem/kandilli/live".into()
}
fn default_usgs_url() -> String {
    "https://earthquake.usgs.gov/fdsnws/event/1/query".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "quake-feed/0.1 (earthquake aggregator)".into()
}
fn default_cache_ttl() -> u64 {
    120
}
fn default_hours_back() -> u32 {
    24
}
fn default_min_magnitude() -> f64 {
    2.0
}
fn default_limit() -> usize {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            app_version: default_app_version(),
            server: ServerConfig::default(),
            sources: SourcesConfig::default(),
            cache: CacheConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_origins: Vec::new(),
            checklist_pdf_path: default_checklist_path(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            kandilli_url: default_kandilli_url(),
            usgs_url: default_usgs_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_mode: SourceMode::default(),
            locale: Locale::default(),
            default_hours_back: default_hours_back(),
            default_min_magnitude: default_min_magnitude(),
            default_limit: default_limit(),
        }
    }
}
