use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::generator::{Charset, Strategy, DEFAULT_CODE_LENGTH};
use crate::storage::{DEFAULT_CACHE_CAPACITY, DEFAULT_HOT_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub shortening: ShorteningConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base used to build short URLs in create responses.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShorteningConfig {
    pub code_length: usize,
    pub strategy: Strategy,
    pub charset: Charset,
    pub default_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub cache_capacity: usize,
    pub hot_threshold: u64,
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("QUICKLINK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("QUICKLINK_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("QUICKLINK_PORT must be a port number")?;

        let base_url = std::env::var("QUICKLINK_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        let code_length = std::env::var("QUICKLINK_CODE_LENGTH")
            .unwrap_or_else(|_| DEFAULT_CODE_LENGTH.to_string())
            .parse::<usize>()
            .context("QUICKLINK_CODE_LENGTH must be a positive integer")?;

        let strategy = match std::env::var("QUICKLINK_CODE_STRATEGY")
            .unwrap_or_else(|_| "random".to_string())
            .to_lowercase()
            .as_str()
        {
            "random" => Strategy::Random,
            "url" | "url-derived" => Strategy::UrlDerived,
            "sequential" => Strategy::Sequential,
            other => {
                tracing::warn!(
                    "Unknown QUICKLINK_CODE_STRATEGY '{other}', falling back to 'random'. \
                     Supported values: random, url, sequential"
                );
                Strategy::Random
            }
        };

        let charset = match std::env::var("QUICKLINK_CODE_CHARSET")
            .unwrap_or_else(|_| "full".to_string())
            .to_lowercase()
            .as_str()
        {
            "full" => Charset::Full,
            "readable" => Charset::Readable,
            other => {
                tracing::warn!(
                    "Unknown QUICKLINK_CODE_CHARSET '{other}', falling back to 'full'. \
                     Supported values: full, readable"
                );
                Charset::Full
            }
        };

        let default_ttl_minutes = std::env::var("QUICKLINK_DEFAULT_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .context("QUICKLINK_DEFAULT_TTL_MINUTES must be an integer")?;

        let cache_capacity = std::env::var("QUICKLINK_CACHE_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_CACHE_CAPACITY.to_string())
            .parse::<usize>()
            .context("QUICKLINK_CACHE_CAPACITY must be a positive integer")?;

        let hot_threshold = std::env::var("QUICKLINK_HOT_THRESHOLD")
            .unwrap_or_else(|_| DEFAULT_HOT_THRESHOLD.to_string())
            .parse::<u64>()
            .context("QUICKLINK_HOT_THRESHOLD must be a non-negative integer")?;

        let sweep_interval_secs = std::env::var("QUICKLINK_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse::<u64>()
            .context("QUICKLINK_SWEEP_INTERVAL_SECS must be a number of seconds")?;

        Ok(Config {
            server: ServerConfig {
                host,
                port,
                base_url,
            },
            shortening: ShorteningConfig {
                code_length,
                strategy,
                charset,
                default_ttl_minutes,
            },
            store: StoreConfig {
                cache_capacity,
                hot_threshold,
                sweep_interval_secs,
            },
        })
    }
}
