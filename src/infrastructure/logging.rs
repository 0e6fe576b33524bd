//! Logging system configuration and initialization
//!
//! Console logging on stderr (stdout is reserved for search output) with:
//! - Configuration based log level, overridable through `RUST_LOG`
//! - Structured JSON logging (optional)
//! - Dependency noise suppressed unless TRACE is requested

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::infrastructure::config::LoggingConfig;

/// Targets that are chatty below TRACE and the level they are capped at
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("reqwest", "info"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("h2", "warn"),
    ("rustls", "warn"),
    ("html5ever", "warn"),
    ("selectors", "warn"),
    ("tokio", "info"),
];

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Build the filter used when `RUST_LOG` is not set
///
/// # Environment Variable Override
/// ```bash
/// # Show detailed HTTP logs
/// RUST_LOG="debug,reqwest=debug,hyper=debug" asearch headphones
/// ```
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)?;

    if !config.level.to_lowercase().contains("trace") {
        for (target, level) in NOISY_TARGETS {
            filter = filter.add_directive(format!("{target}={level}").parse()?);
        }
    }

    Ok(filter)
}

/// Initialize logging with custom configuration
///
/// Calling this more than once is harmless: the first subscriber stays installed.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;
    let registry = Registry::default().with(env_filter);

    let installed = if config.json_format {
        let layer = fmt::Layer::new()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false);
        registry.with(layer).try_init()
    } else {
        let layer = fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_target(config.with_target);
        registry.with(layer).try_init()
    };

    if installed.is_err() {
        debug!("Global subscriber already installed, keeping it");
        return Ok(());
    }

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    info!("JSON format: {}", config.json_format);
    if config.level.to_lowercase().contains("trace") {
        info!("TRACE level active - dependency logs are not filtered");
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== ASearch System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
    info!("==================================");
}
