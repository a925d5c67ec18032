//! Output module for song records and crawl statistics
//!
//! This module handles:
//! - The sink trait records are written through
//! - The JSON Lines item feed
//! - Crawl statistics and their printout

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{CollectingSink, OutputError, OutputResult, RecordSink};
