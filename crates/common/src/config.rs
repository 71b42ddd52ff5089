//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use url::Url;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    /// Server configuration.
    #[validate(nested)]
    pub server: ServerConfig,
    /// Database configuration.
    #[validate(nested)]
    pub database: DatabaseConfig,
    /// Redis configuration.
    #[validate(nested)]
    pub redis: RedisConfig,
    /// Federation configuration.
    #[serde(default)]
    pub federation: FederationConfig,
    /// Shared payload cache configuration.
    #[serde(default)]
    #[validate(nested)]
    pub cache: CacheConfig,
    /// In-process job runner configuration.
    #[serde(default)]
    #[validate(nested)]
    pub jobs: JobsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerConfig {
    /// Public URL of this instance. The local domain is derived from it.
    #[validate(url)]
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RedisConfig {
    /// Redis connection URL.
    #[validate(url)]
    pub url: String,
    /// Namespace prepended to stream channels and cache keys. Empty means none.
    #[serde(default)]
    pub prefix: String,
}

/// Federation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FederationConfig {
    /// Whether federation is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Software names known to treat unlisted/limited visibility as public.
    #[serde(default = "default_incompatible_software")]
    pub incompatible_software: Vec<String>,
}

/// Shared payload cache configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CacheConfig {
    /// Time to live of a rendered status payload, in seconds.
    #[serde(default = "default_payload_ttl")]
    #[validate(range(min = 1))]
    pub payload_ttl_secs: i64,
}

/// In-process job runner configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JobsConfig {
    /// Maximum number of jobs processed concurrently.
    #[serde(default = "default_workers")]
    #[validate(range(min = 1))]
    pub workers: usize,
    /// Capacity of the job channel. Jobs beyond it are dropped.
    #[serde(default = "default_buffer")]
    #[validate(range(min = 1))]
    pub buffer: usize,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            incompatible_software: default_incompatible_software(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            payload_ttl_secs: default_payload_ttl(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            buffer: default_buffer(),
        }
    }
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_true() -> bool {
    true
}

fn default_incompatible_software() -> Vec<String> {
    ["misskey", "calckey", "cherrypick"]
        .into_iter()
        .map(String::from)
        .collect()
}

const fn default_payload_ttl() -> i64 {
    60 * 60
}

const fn default_workers() -> usize {
    4
}

const fn default_buffer() -> usize {
    1000
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FANOUT_ENV`)
    /// 4. Environment variables with `FANOUT_` prefix
    ///
    /// The result is validated before it is returned.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let env = std::env::var("FANOUT_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FANOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FANOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The domain this instance federates as, taken from `server.url`.
    pub fn local_domain(&self) -> AppResult<String> {
        let url = Url::parse(&self.server.url)
            .map_err(|e| AppError::Config(format!("Invalid server.url: {e}")))?;

        let host = url
            .host_str()
            .ok_or_else(|| AppError::Config("server.url has no host".to_string()))?;

        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    /// Public URL without a trailing slash.
    #[must_use]
    pub fn server_url(&self) -> String {
        self.server.url.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config_with_url(url: &str) -> Config {
        Config {
            server: ServerConfig {
                url: url.to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/fanout".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
            },
            redis: RedisConfig {
                url: "redis://localhost".to_string(),
                prefix: String::new(),
            },
            federation: FederationConfig::default(),
            cache: CacheConfig::default(),
            jobs: JobsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_local_domain_from_url() {
        let config = config_with_url("https://social.example/");
        assert_eq!(config.local_domain().unwrap(), "social.example");
        assert_eq!(config.server_url(), "https://social.example");
    }

    #[test]
    fn test_local_domain_keeps_port() {
        let config = config_with_url("http://localhost:3000");
        assert_eq!(config.local_domain().unwrap(), "localhost:3000");
    }

    #[test]
    fn test_local_domain_invalid_url() {
        let config = config_with_url("not a url");
        assert!(matches!(config.local_domain(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_federation_defaults() {
        let federation = FederationConfig::default();
        assert!(federation.enabled);
        assert_eq!(
            federation.incompatible_software,
            vec!["misskey", "calckey", "cherrypick"]
        );
    }

    #[test]
    fn test_validation_rejects_idle_job_runner() {
        let mut config = config_with_url("https://social.example");
        assert!(config.validate().is_ok());

        config.jobs.workers = 0;
        let err: AppError = config.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validation_rejects_relative_server_url() {
        let config = config_with_url("/relative");
        assert!(config.validate().is_err());
    }
}
