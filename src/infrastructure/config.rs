//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (see [`defaults`])
//! 2. An optional configuration file (TOML, JSON, YAML, ...)
//! 3. Environment variables, e.g. `ASEARCH__SEARCH__MAX_PAGES=10`
//!
//! Nothing is ever written back; the application keeps no persisted state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::constants::MAX_PAGES_CEILING;

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "ASEARCH";

/// Directory name below the platform config directory
pub const APP_DIR_NAME: &str = "asearch";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Outbound HTTP behaviour
    pub http: HttpClientConfig,

    /// Pagination and extraction behaviour
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP client configuration for the shared transport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Browser-like user agent; storefronts reject obvious bots
    pub user_agent: String,

    pub accept: String,

    pub accept_language: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Requests per second across all workers, 0 disables pacing
    pub max_requests_per_second: u32,

    pub follow_redirects: bool,
}

/// How a container that cannot be turned into a record is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPolicy {
    /// Log the failure and skip the container
    #[default]
    Lenient,
    /// Fail the page with the container's raw markup attached
    Strict,
}

/// How a failed result page (other than the first) affects the search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFailurePolicy {
    /// Log a warning; the page contributes no records
    #[default]
    Skip,
    /// Fail the whole search
    Abort,
}

/// Pagination orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum result pages per search (1..=50)
    pub max_pages: u32,

    /// Worker pool size for page fetches, 0 uses the available parallelism
    pub max_concurrent_pages: usize,

    /// Optional ceiling on a single page fetch, on top of the HTTP timeout
    pub page_timeout_seconds: Option<u64>,

    pub extraction_policy: ExtractionPolicy,

    pub page_failure_policy: PageFailurePolicy,

    /// Replaces the storefront root (`https://www.amazon.<domain>`) when set
    pub base_url: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Include the module target in each line
    pub with_target: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            accept: defaults::ACCEPT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_pages: defaults::MAX_PAGES,
            max_concurrent_pages: defaults::MAX_CONCURRENT_PAGES,
            page_timeout_seconds: None,
            extraction_policy: ExtractionPolicy::default(),
            page_failure_policy: PageFailurePolicy::default(),
            base_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            with_target: false,
        }
    }
}

impl SearchConfig {
    /// Worker pool size with the "auto" value resolved
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrent_pages > 0 {
            return self.max_concurrent_pages;
        }
        std::thread::available_parallelism().map_or(defaults::FALLBACK_CONCURRENCY, usize::from)
    }

    /// Configured page limit, never above the hard ceiling
    pub fn page_limit(&self) -> u32 {
        self.max_pages.clamp(1, MAX_PAGES_CEILING)
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "http.timeout_seconds must be greater than 0".to_string(),
            });
        }

        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "http.user_agent must not be empty".to_string(),
            });
        }

        if !(1..=MAX_PAGES_CEILING).contains(&self.search.max_pages) {
            return Err(ConfigError::Validation {
                message: format!(
                    "search.max_pages must be between 1 and {MAX_PAGES_CEILING}, got {}",
                    self.search.max_pages
                ),
            });
        }

        if self.search.page_timeout_seconds == Some(0) {
            return Err(ConfigError::Validation {
                message: "search.page_timeout_seconds must be greater than 0 when set".to_string(),
            });
        }

        Ok(())
    }
}

/// Resolves and loads the layered configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Use the default configuration file location, if one exists
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Get the application configuration directory
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
    }

    /// Load defaults, then the file, then the environment, and validate the result
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.config_path {
            info!("Loading configuration from: {:?}", path);
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        } else if let Some(dir) = Self::get_config_dir() {
            let stem = dir.join("config");
            debug!("Looking for optional configuration at: {:?}", stem);
            builder = builder.add_source(
                config::File::with_name(&stem.to_string_lossy()).required(false),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// Default configuration values
pub mod defaults {
    /// Desktop Firefox user agent
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/111.0";

    pub const ACCEPT: &str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// No pacing by default
    pub const MAX_REQUESTS_PER_SECOND: u32 = 0;

    /// Default maximum pages per search
    pub const MAX_PAGES: u32 = 50;

    /// 0 = available parallelism
    pub const MAX_CONCURRENT_PAGES: usize = 0;

    /// Pool size used when the available parallelism cannot be queried
    pub const FALLBACK_CONCURRENCY: usize = 4;

    pub const LOG_LEVEL: &str = "info";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_pages, 50);
        assert_eq!(config.search.extraction_policy, ExtractionPolicy::Lenient);
        assert_eq!(config.search.page_failure_policy, PageFailurePolicy::Skip);
    }

    #[test]
    fn page_limit_never_exceeds_ceiling() {
        let config = SearchConfig {
            max_pages: 500,
            ..Default::default()
        };
        assert_eq!(config.page_limit(), MAX_PAGES_CEILING);
    }

    #[test]
    fn auto_concurrency_is_positive() {
        assert!(SearchConfig::default().effective_concurrency() >= 1);
        let fixed = SearchConfig {
            max_concurrent_pages: 3,
            ..Default::default()
        };
        assert_eq!(fixed.effective_concurrency(), 3);
    }

    #[test]
    fn loads_partial_toml_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nmax_pages = 5\nextraction_policy = \"strict\"\n\n[http]\nuser_agent = \"TestAgent/1.0\""
        )
        .unwrap();

        let config = ConfigManager::with_path(file.path()).load().unwrap();

        assert_eq!(config.search.max_pages, 5);
        assert_eq!(config.search.extraction_policy, ExtractionPolicy::Strict);
        assert_eq!(config.search.page_failure_policy, PageFailurePolicy::Skip);
        assert_eq!(config.http.user_agent, "TestAgent/1.0");
        assert_eq!(config.http.timeout_seconds, defaults::REQUEST_TIMEOUT_SECONDS);
    }

    #[test]
    fn rejects_out_of_range_page_limit() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"search": {{"max_pages": 51}}}}"#).unwrap();

        let err = ConfigManager::with_path(file.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigManager::with_path(dir.path().join("absent.toml")).load();
        assert!(matches!(result, Err(ConfigError::Load { .. })));
    }
}
