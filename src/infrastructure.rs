//! Infrastructure layer for HTTP access, HTML parsing, configuration and logging
//!
//! Everything that touches the network, the filesystem or the process
//! environment lives here; the domain layer stays free of I/O.

pub mod config;
pub mod grading_backend;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, ConfigManager};
pub use grading_backend::{
    extract_html_fragment, BootstrapError, GradingBackend, RemoteGradingBackend, RemoteSession, SearchError,
};
pub use http_client::{HttpClient, HttpError};
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{LandingPageParser, ParsingError, ParsingResult, PlayerTableParser};
