//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

/// Secret used when `JWT_SECRET` is not set. Fine for local runs only.
pub const DEV_JWT_SECRET: &str = "vending-dev-secret-change-in-production";

/// 30 days.
const DEFAULT_JWT_LIFETIME_SECS: &str = "2592000";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// Redis connection string (optional, memory store without it)
    pub redis_url: Option<String>,

    /// Namespace for every stored key
    pub key_prefix: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Mini-app manifest fields
    pub manifest: ManifestConfig,
}

/// Values published in `/.well-known/farcaster.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Public URL of the web client
    pub app_url: String,
    pub app_name: String,
    pub button_title: String,
    pub splash_background_color: String,
    pub webhook_url: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),

            key_prefix: env::var("KEY_PREFIX").unwrap_or_else(|_| "vending".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // In production, this MUST be set via environment variable
                DEV_JWT_SECRET.to_string()
            }),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| DEFAULT_JWT_LIFETIME_SECS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            manifest: ManifestConfig {
                app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
                app_name: env::var("APP_NAME").unwrap_or_else(|_| "Vending".to_string()),
                button_title: env::var("APP_BUTTON_TITLE")
                    .unwrap_or_else(|_| "Abrir".to_string()),
                splash_background_color: env::var("APP_SPLASH_BACKGROUND_COLOR")
                    .unwrap_or_else(|_| "#ffffff".to_string()),
                webhook_url: env::var("APP_WEBHOOK_URL").ok(),
            },
        };

        if config.key_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("KEY_PREFIX".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    /// Socket address the server listens on.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))
    }

    /// Whether the signing secret is still the built-in development one.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Configuration for tests: memory store, fixed secret.
    pub fn for_tests() -> Self {
        ApiConfig {
            http_port: 0,
            bind_addr: "127.0.0.1".to_string(),
            redis_url: None,
            key_prefix: "vending-test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_secs: 3600,
            manifest: ManifestConfig {
                app_url: "https://vending.example.com".to_string(),
                app_name: "Vending".to_string(),
                button_title: "Abrir".to_string(),
                splash_background_color: "#ffffff".to_string(),
                webhook_url: None,
            },
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
