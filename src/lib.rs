//! kpop-crawler: Mnet TOP100 chart scraper
//!
//! This crate walks the Mnet annual TOP100 chart, follows every song's detail
//! link and extracts title, artist, duration and contributor credits into
//! [`SongRecord`]s.

pub mod chart;
pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while extracting data from a fetched page.
///
/// Every variant is local to one page: the record is dropped and the crawl
/// carries on with the others.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("No numeric song id in {url}")]
    MalformedIdentifier { url: String },

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Staff header not found in credits block")]
    MissingStaffHeader,

    #[error("Invalid selector {0}")]
    Selector(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page parsing
pub type ParseResult<T> = std::result::Result<T, ParseError>;

// Re-export commonly used types
pub use chart::{ChartPage, ChartPageContext, ChartRequest, Credits, ItemRequest, Role, SongRecord};
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
