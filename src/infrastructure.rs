//! Infrastructure layer: configuration, logging, HTTP transport and HTML parsing.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod page_fetcher;
pub mod parsing;
pub mod transport;

// Re-export commonly used types
pub use config::{
    AppConfig, ConfigError, ConfigManager, ExtractionPolicy, HttpClientConfig, LoggingConfig,
    PageFailurePolicy, SearchConfig,
};
pub use http_client::HttpClient;
pub use logging::{init_logging, init_logging_with_config, log_system_info};
pub use page_fetcher::PageFetcher;
pub use parsing::{ParseContext, ParsingError, SearchResultParser, SearchResultSelectors};
pub use transport::{Transport, TransportError};
