//! quake-feed: aggregated earthquake feed.
//!
//! Single-binary Tokio application that:
//! 1. Pulls recent events from the Kandilli live feed and the USGS catalog
//! 2. Merges them into one newest-first feed, deferring to Kandilli inside Turkey
//! 3. Caches each query's result for a short TTL
//! 4. Serves the feed, stats, and health endpoints over HTTP

mod config;

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use aggregator::{Aggregator, QuakeService, ResponseCache};
use common::config::AppConfig;
use common::{EarthquakeSource, SourceFetch};
use kandilli_client::KandilliClient;
use quake_api::api::earthquakes::{EarthquakeParams, EarthquakesResponse};
use quake_api::{build_router, AppState, FeedService};
use usgs_client::UsgsClient;

/// Aggregated earthquake feed (Kandilli + USGS)
#[derive(Parser)]
#[command(name = "quake-feed", about = "Aggregated earthquake feed service")]
struct Cli {
    /// Fetch once from each upstream, report counts, then exit.
    #[arg(long)]
    check_sources: bool,

    /// Run a single query, print the JSON response, then exit.
    #[arg(long)]
    once: bool,

    /// Lookback window in hours for --once.
    #[arg(long)]
    hours_back: Option<u32>,

    /// Magnitude floor for --once.
    #[arg(long)]
    min_magnitude: Option<f64>,

    /// Maximum records for --once.
    #[arg(long)]
    limit: Option<usize>,

    /// Source mode for --once: kandilli, usgs or hybrid.
    #[arg(long)]
    source: Option<String>,

    /// Listen address, overriding BIND_ADDR and config.toml.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "quake_feed=info,aggregator=info,kandilli_client=info,usgs_client=info,quake_api=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("quake-feed starting up...");

    // Load configuration.
    let mut cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(bind) = cli.bind.clone() {
        cfg.server.bind_addr = bind;
    }

    info!("Environment: {} ({} v{})", cfg.app_env, cfg.app_name, cfg.app_version);
    info!(
        "Sources: kandilli={} usgs={} timeout={}s",
        cfg.sources.kandilli_url, cfg.sources.usgs_url, cfg.sources.timeout_secs
    );
    info!(
        "Query defaults: mode={} hours_back={} min_magnitude={} limit={} locale={:?}; cache ttl={}s",
        cfg.query.default_mode,
        cfg.query.default_hours_back,
        cfg.query.default_min_magnitude,
        cfg.query.default_limit,
        cfg.query.locale,
        cfg.cache.ttl_secs,
    );

    let service = match build_service(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("Client initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    // ── Check-sources mode ───────────────────────────────────────────
    if cli.check_sources {
        if !check_sources(&service, &cfg).await {
            std::process::exit(1);
        }
        return;
    }

    // ── Single-query mode ────────────────────────────────────────────
    if cli.once {
        let params = EarthquakeParams {
            hours_back: cli.hours_back,
            min_magnitude: cli.min_magnitude,
            limit: cli.limit,
            source: cli.source.clone(),
        };
        let query = match params.into_query(&cfg.query) {
            Ok(q) => q,
            Err(e) => {
                error!("{}", e);
                std::process::exit(2);
            }
        };

        let result = service.earthquakes(&query).await;
        let response = EarthquakesResponse::render(&result, Utc::now(), cfg.query.locale);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to encode response: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // ── Serve ────────────────────────────────────────────────────────
    let bind_addr = cfg.server.bind_addr.clone();
    if cfg.server.cors_origins.is_empty() {
        info!("CORS disabled (no origins configured)");
    } else {
        info!("CORS origins: {:?}", cfg.server.cors_origins);
    }
    let app = build_router(AppState::new(service, cfg));

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("quake-feed stopped.");
}

fn build_service(cfg: &AppConfig) -> Result<FeedService, common::Error> {
    let kandilli = KandilliClient::new(&cfg.sources)?;
    let usgs = UsgsClient::new(&cfg.sources)?;

    Ok(QuakeService::new(
        Aggregator::new(kandilli, usgs, Duration::from_secs(cfg.sources.timeout_secs)),
        ResponseCache::new(Duration::from_secs(cfg.cache.ttl_secs)),
    ))
}

/// Fetch once from each upstream with the configured defaults.
///
/// Returns false when neither upstream answered.
async fn check_sources(service: &FeedService, cfg: &AppConfig) -> bool {
    info!("Checking upstream sources...");
    let aggregator = service.aggregator();
    let (hours, floor, limit) = (
        cfg.query.default_hours_back,
        cfg.query.default_min_magnitude,
        cfg.query.default_limit,
    );

    let (regional, global) = tokio::join!(
        aggregator.regional().fetch(hours, floor, limit),
        aggregator.global().fetch(hours, floor, limit),
    );

    let mut reachable = 0;
    for (label, outcome) in [("Kandilli", &regional), ("USGS", &global)] {
        match outcome {
            SourceFetch::Fetched(records) => {
                reachable += 1;
                info!("✅ {}: {} earthquakes in the last {}h", label, records.len(), hours);
            }
            SourceFetch::Unavailable { reason } => {
                warn!("❌ {}: unavailable ({})", label, reason);
            }
        }
    }

    reachable > 0
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received, draining connections...");
}
