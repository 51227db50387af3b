//! Configuration management for the shop service
//!
//! Loads configuration from environment variables with development
//! defaults; `dotenvy` picks up a local `.env` in `main`.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Bound execution time for read-side store queries (seconds)
    pub read_timeout_secs: u64,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub redis_url: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for bearer-token verification
    pub jwt_secret: String,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app: AppConfig {
                env: env_or("APP_ENV", "dev"),
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "8080").parse().unwrap_or(8080),
                read_timeout_secs: env_or("READ_TIMEOUT_SECS", "10").parse().unwrap_or(10),
            },
            cache: CacheConfig {
                redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            },
            auth: AuthConfig {
                jwt_secret: env_or("JWT_SECRET", "dev-secret-change-me"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        let cfg = Config::from_env();
        assert!(!cfg.app.host.is_empty());
        assert!(cfg.app.read_timeout_secs > 0);
    }
}
