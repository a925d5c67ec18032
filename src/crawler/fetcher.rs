//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Retry logic for transient failures
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Status codes worth another attempt
pub const RETRY_HTTP_CODES: [u16; 8] = [500, 502, 503, 504, 522, 524, 408, 429];

/// Upper bound on the TCP connect phase
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// True if another attempt might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Success { .. } => false,
            Self::HttpError { status_code } => is_retryable_status(*status_code),
            Self::NetworkError { .. } => true,
        }
    }
}

/// True for status codes in [`RETRY_HTTP_CODES`]
pub fn is_retryable_status(status_code: u16) -> bool {
    RETRY_HTTP_CODES.contains(&status_code)
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall per-request timeout
///
/// # Example
///
/// ```no_run
/// use kpop_crawler::config::UserAgentConfig;
/// use kpop_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(180)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 408, 429, 500, 502, 503, 504, 522, 524 | Retry up to `retry_times` more times |
/// | Other HTTP status | Immediate HttpError |
/// | Timeout / connection error | Retry up to `retry_times` more times |
///
/// Redirects are followed by the client; `final_url` is where they ended.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `retry_times` - Extra attempts after the first
pub async fn fetch_page(client: &Client, url: &Url, retry_times: u32) -> FetchResult {
    let mut attempt = 0;
    loop {
        let result = fetch_once(client, url).await;
        if !result.is_retryable() {
            return result;
        }
        if attempt >= retry_times {
            if retry_times > 0 {
                tracing::debug!("Gave up retrying {} after {} attempts", url, attempt + 1);
            }
            return result;
        }
        attempt += 1;
        tracing::debug!(
            "Retrying {} (retry {}/{}): {:?}",
            url,
            attempt,
            retry_times,
            result
        );
    }
}

/// Performs a single GET request
async fn fetch_once(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
