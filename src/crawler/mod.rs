//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the machinery around the chart parsers:
//! - HTTP fetching with retry logic
//! - Requests carrying their context, and duplicate filtering
//! - Concurrent crawl coordination

mod coordinator;
mod fetcher;
mod request;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, fetch_page, is_retryable_status, FetchResult, RETRY_HTTP_CODES,
};
pub use request::{Page, Request, RequestFilter};
