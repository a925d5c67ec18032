//! Crawl statistics
//!
//! Counters kept by the coordinator while it runs, printed once the crawl
//! is over.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished, if it has
    pub finished_at: Option<DateTime<Utc>>,

    /// Chart pages fetched successfully
    pub chart_pages_fetched: u64,

    /// Song pages fetched successfully
    pub song_pages_fetched: u64,

    /// Records written to the sink
    pub songs_emitted: u64,

    /// Song pages that did not yield a record
    pub songs_dropped: u64,

    /// Requests that failed after all retries
    pub fetch_failures: u64,

    /// Requests skipped because their URL was already seen
    pub duplicates_filtered: u64,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStatistics {
    /// Creates statistics for a crawl starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            chart_pages_fetched: 0,
            song_pages_fetched: 0,
            songs_emitted: 0,
            songs_dropped: 0,
            fetch_failures: 0,
            duplicates_filtered: 0,
        }
    }

    /// Marks the crawl as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Elapsed seconds between start and finish
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of fetched song pages that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.song_pages_fetched == 0 {
            return 0.0;
        }
        (self.songs_emitted as f64 / self.song_pages_fetched as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Requests:");
    println!("  Chart pages fetched: {}", stats.chart_pages_fetched);
    println!("  Song pages fetched: {}", stats.song_pages_fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Duplicates filtered: {}", stats.duplicates_filtered);
    println!();

    println!("Songs:");
    println!("  Emitted: {}", stats.songs_emitted);
    println!("  Dropped: {}", stats.songs_dropped);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} song pages produced a record)",
        stats.success_rate(),
        stats.songs_emitted,
        stats.song_pages_fetched
    );
}
