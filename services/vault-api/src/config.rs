//! Configuration for the Vault API service.

use std::time::Duration;

use passvault_billing_core::{is_supported_currency, PayHereConfig};
use passvault_db::PoolOptions;

/// Where records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local store; nothing survives a restart
    Memory,
}

/// Vault API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Record store backend
    pub store_backend: StoreBackend,
    /// Database URL, required for the postgres backend
    pub database_url: Option<String>,
    /// Pool sizing and acquire timeout
    pub pool: PoolOptions,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    /// PayHere merchant configuration
    pub payhere: PayHereConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Store
        let store_backend = match var("STORE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let max_connections = var("DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|_| ConfigError::Invalid("DB_MAX_CONNECTIONS"))?;

        let acquire_timeout_secs: u64 = var("DB_ACQUIRE_TIMEOUT_SECS", "5")
            .parse()
            .map_err(|_| ConfigError::Invalid("DB_ACQUIRE_TIMEOUT_SECS"))?;

        // Server
        let http_port = var("HTTP_PORT", "8080")
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        let metrics_enabled = var("METRICS_ENABLED", "true").parse().unwrap_or(true);

        // Identity
        let jwt_secret = lookup("IDENTITY_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("IDENTITY_JWT_SECRET"))?;

        // PayHere
        let currency = var("PAYHERE_CURRENCY", "LKR").to_uppercase();
        if !is_supported_currency(&currency) {
            return Err(ConfigError::Invalid("PAYHERE_CURRENCY"));
        }

        let mut payhere = PayHereConfig::new(currency);
        if let (Some(merchant_id), Some(secret)) =
            (lookup("PAYHERE_MERCHANT_ID"), lookup("PAYHERE_SECRET"))
        {
            payhere = payhere.with_credentials(merchant_id, secret);
        } else {
            tracing::warn!("PayHere credentials not set; webhooks will be rejected");
        }

        Ok(Self {
            http_port,
            store_backend,
            database_url,
            pool: PoolOptions {
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
            jwt_secret,
            payhere,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
