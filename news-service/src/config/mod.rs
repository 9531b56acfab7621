use reqwest::Url;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_UPSTREAM_URL: &str = "https://isegp27f20.execute-api.eu-north-1.amazonaws.com";
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub proxy: ProxyConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub upstream: Url,
    /// Path prefix routed to the upstream, e.g. `/api`.
    pub prefix: String,
    pub max_body_bytes: usize,
}

impl NewsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let mut common = core_config::Config::load()?;

        if let Ok(port) = env::var("PORT") {
            common.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e))
            })?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            common.log_level = level;
        }

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let max_body_bytes = get_env(
            "PROXY_MAX_BODY_BYTES",
            Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
            false,
        )?;

        Ok(NewsConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env("MONGO_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGO_DATABASE", Some("news_database"), false)?,
                collection: get_env("MONGO_COLLECTION", Some("summaries"), false)?,
            },
            proxy: ProxyConfig {
                upstream: parse_upstream(&get_env(
                    "PROXY_UPSTREAM_URL",
                    Some(DEFAULT_UPSTREAM_URL),
                    false,
                )?)?,
                prefix: normalize_prefix(&get_env("PROXY_PREFIX", Some("/api"), false)?)?,
                max_body_bytes: max_body_bytes.parse().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "Invalid PROXY_MAX_BODY_BYTES '{}': {}",
                        max_body_bytes,
                        e
                    ))
                })?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

/// Parses the upstream origin. Only http(s) URLs with a host are accepted.
pub fn parse_upstream(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid upstream URL '{}': {}", raw, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "Upstream URL must be an http(s) origin, got '{}'",
            raw
        )));
    }

    Ok(url)
}

/// Normalizes a route prefix to a leading slash and no trailing slash.
pub fn normalize_prefix(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "Proxy prefix must name at least one path segment"
        )));
    }
    Ok(format!("/{}", trimmed))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
