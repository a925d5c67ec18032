use serde::Deserialize;

/// Site root the chart paths are joined onto
pub const DEFAULT_BASE_URL: &str = "http://www.mnet.com";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chart: ChartConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Which charts to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// First chart year (inclusive)
    #[serde(rename = "start-year")]
    pub start_year: i32,

    /// Last chart year (inclusive)
    #[serde(rename = "end-year")]
    pub end_year: i32,

    /// Site root, e.g. "http://www.mnet.com"
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            start_year: 2011,
            end_year: 2011,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Fetch behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Extra attempts for a request that failed transiently
    #[serde(rename = "retry-times")]
    pub retry_times: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 16,
            retry_times: 2,
            request_timeout: 180,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "kpop-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/kpop-crawler/kpop-crawler".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON Lines file receiving one record per song; stdout when unset
    #[serde(rename = "items-path")]
    pub items_path: Option<String>,

    /// Log file; stderr when unset
    #[serde(rename = "log-path")]
    pub log_path: Option<String>,
}
