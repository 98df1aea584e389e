//! Configuration loader: merges .env, config.toml, and environment variables.

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use common::config::AppConfig;
use common::{Error, Locale, QuakeQuery, SourceMode};

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.app_name.trim().is_empty() {
        issues.push("app_name must not be empty".into());
    }
    if SocketAddr::from_str(&config.server.bind_addr).is_err() {
        issues.push(format!(
            "server.bind_addr must be a socket address (got '{}')",
            config.server.bind_addr
        ));
    }

    for (name, url) in [
        ("sources.kandilli_url", &config.sources.kandilli_url),
        ("sources.usgs_url", &config.sources.usgs_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(format!("{name} must be an http(s) URL"));
        }
    }
    if config.sources.timeout_secs == 0 {
        issues.push("sources.timeout_secs must be > 0".into());
    }
    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }

    if let Err(e) = QuakeQuery::new(
        config.query.default_hours_back,
        config.query.default_min_magnitude,
        config.query.default_limit,
        config.query.default_mode,
    ) {
        issues.push(format!("query defaults out of range: {e}"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(name) = std::env::var("APP_NAME") {
        config.app_name = name;
    }
    if let Ok(env) = std::env::var("APP_ENV") {
        config.app_env = env;
    }
    if let Ok(version) = std::env::var("APP_VERSION") {
        config.app_version = version;
    }
    if let Ok(origins) = std::env::var("CORS_ORIGINS") {
        config.server.cors_origins = parse_origins(&origins);
    }
    if let Ok(addr) = std::env::var("BIND_ADDR") {
        config.server.bind_addr = addr.trim().to_string();
    }
    if let Ok(path) = std::env::var("CHECKLIST_PDF_PATH") {
        config.server.checklist_pdf_path = path;
    }
    if let Ok(url) = std::env::var("KANDILLI_URL") {
        config.sources.kandilli_url = url.trim().to_string();
    }
    if let Ok(url) = std::env::var("USGS_URL") {
        config.sources.usgs_url = url.trim().to_string();
    }
    if let Ok(raw) = std::env::var("QUAKE_UPSTREAM_TIMEOUT_SECS") {
        config.sources.timeout_secs = parse_positive_u64(&raw, "QUAKE_UPSTREAM_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("QUAKE_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "QUAKE_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("QUAKE_DEFAULT_MODE") {
        config.query.default_mode = SourceMode::from_str(&raw).map_err(|_| {
            Error::Config("QUAKE_DEFAULT_MODE must be one of: kandilli, usgs, hybrid".into())
        })?;
    }
    if let Ok(raw) = std::env::var("QUAKE_LOCALE") {
        config.query.locale = Locale::parse(&raw)
            .ok_or_else(|| Error::Config("QUAKE_LOCALE must be one of: en, tr".into()))?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validation_collects_every_issue() {
        let mut config = AppConfig::default();
        config.server.bind_addr = "not-an-address".into();
        config.sources.usgs_url = "ftp://example.org".into();
        config.cache.ttl_secs = 0;
        config.query.default_limit = 0;

        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.contains("server.bind_addr"));
        assert!(msg.contains("sources.usgs_url"));
        assert!(msg.contains("cache.ttl_secs"));
        assert!(msg.contains("query defaults"));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_parse_positive_u64() {
        assert_eq!(parse_positive_u64(" 30 ", "X").unwrap(), 30);
        assert!(parse_positive_u64("0", "X").is_err());
        assert!(parse_positive_u64("soon", "X").is_err());
    }

    #[test]
    fn test_toml_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            app_env = "prod"

            [server]
            bind_addr = "127.0.0.1:9000"
            cors_origins = ["https://deprem.example"]

            [cache]
            ttl_secs = 60

            [query]
            default_mode = "kandilli"
            locale = "tr"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_env, "prod");
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.server.cors_origins, vec!["https://deprem.example"]);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.query.default_mode, SourceMode::Kandilli);
        assert_eq!(config.query.locale, Locale::Turkish);
        assert_eq!(config.sources.timeout_secs, 10);
        assert!(validate_config(&config).is_ok());
    }
}
