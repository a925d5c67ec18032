//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Seeding the chart page requests
//! - Fetching chart and song pages concurrently
//! - Turning chart pages into song requests
//! - Turning song pages into records for the sink
//!
//! Parsing happens inside the fetch tasks but never across an `.await`:
//! `scraper::Html` is not `Send`, so each document is built and dropped in
//! one synchronous call.

use crate::chart::{
    chart_requests, parse_chart_page, parse_song_page, ChartPageContext, ItemRequest, SongRecord,
};
use crate::config::Config;
use crate::crawler::request::{Page, Request, RequestFilter};
use crate::crawler::{build_http_client, fetch_page, FetchResult};
use crate::output::{CrawlStatistics, RecordSink};
use crate::{CrawlerError, ParseResult};
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// What a fetch task reports back to the crawl loop
enum Outcome {
    Chart {
        page: ChartPageContext,
        url: Url,
        items: ParseResult<Vec<ItemRequest>>,
    },
    Song {
        item: ItemRequest,
        url: Url,
        record: ParseResult<SongRecord>,
    },
    Failed {
        url: Url,
        error: String,
    },
}

/// Main crawler coordinator structure
pub struct Coordinator<S> {
    config: Arc<Config>,
    client: Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
    filter: RequestFilter,
    sink: S,
    stats: CrawlStatistics,
}

impl<S: RecordSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Where song records are written
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlerError)` - Bad base URL or HTTP client setup failure
    pub fn new(config: Config, sink: S) -> Result<Self, CrawlerError> {
        let base_url = Url::parse(&config.chart.base_url)?;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout),
        )?;
        let semaphore = Arc::new(Semaphore::new(
            config.crawler.max_concurrent_requests as usize,
        ));

        Ok(Self {
            config: Arc::new(config),
            client,
            base_url,
            semaphore,
            filter: RequestFilter::new(),
            sink,
            stats: CrawlStatistics::new(),
        })
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Consumes the coordinator, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs the crawl to completion
    ///
    /// Fetch and parse failures drop the affected page and are counted; only
    /// a failing sink aborts the crawl.
    pub async fn run(&mut self) -> Result<CrawlStatistics, CrawlerError> {
        let chart = &self.config.chart;
        let requests = chart_requests(&self.base_url, chart.start_year, chart.end_year);
        tracing::info!(
            "Crawling {} chart pages for {}-{}",
            requests.len(),
            chart.start_year,
            chart.end_year
        );

        let mut tasks = JoinSet::new();
        for chart_request in requests {
            let request = Request::new(chart_request.url.clone(), chart_request.context());
            if self.filter.admit(&request) {
                self.spawn_chart(&mut tasks, request);
            } else {
                self.stats.duplicates_filtered += 1;
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => self.handle_outcome(outcome, &mut tasks)?,
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                    self.stats.fetch_failures += 1;
                }
            }
        }

        self.sink.finish()?;
        self.stats.finish();

        tracing::info!(
            "Crawl completed: {} songs emitted, {} dropped, {} failed fetches",
            self.stats.songs_emitted,
            self.stats.songs_dropped,
            self.stats.fetch_failures
        );

        Ok(self.stats.clone())
    }

    fn handle_outcome(
        &mut self,
        outcome: Outcome,
        tasks: &mut JoinSet<Outcome>,
    ) -> Result<(), CrawlerError> {
        match outcome {
            Outcome::Chart { page, url, items } => {
                self.stats.chart_pages_fetched += 1;
                let items = match items {
                    Ok(items) => items,
                    Err(e) => {
                        tracing::error!("Cannot parse chart page {}: {}", url, e);
                        return Ok(());
                    }
                };

                tracing::info!(
                    "Chart {} page {}: {} songs",
                    page.year,
                    page.page,
                    items.len()
                );
                if items.is_empty() {
                    tracing::warn!("No song links found on {}", url);
                }

                for item in items {
                    let request = Request::new(item.url.clone(), item).dont_filter();
                    if self.filter.admit(&request) {
                        self.spawn_song(tasks, request);
                    } else {
                        self.stats.duplicates_filtered += 1;
                    }
                }
            }

            Outcome::Song { item, url, record } => {
                self.stats.song_pages_fetched += 1;
                match record {
                    Ok(record) => {
                        tracing::debug!(
                            "Scraped {} #{}: {} ({})",
                            record.year,
                            record.rank,
                            record.title,
                            record.id
                        );
                        self.sink.write(&record)?;
                        self.stats.songs_emitted += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Dropping {} #{} from {}: {}",
                            item.year,
                            item.rank,
                            url,
                            e
                        );
                        self.stats.songs_dropped += 1;
                    }
                }
            }

            Outcome::Failed { url, error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                self.stats.fetch_failures += 1;
            }
        }

        Ok(())
    }

    fn spawn_chart(&self, tasks: &mut JoinSet<Outcome>, request: Request<ChartPageContext>) {
        let client = self.client.clone();
        let semaphore = Arc::clone(&self.semaphore);
        let retry_times = self.config.crawler.retry_times;

        tasks.spawn(async move {
            let page = match fetch(&client, &semaphore, request, retry_times).await {
                Ok(page) => page,
                Err(failed) => return failed,
            };
            let items = parse_chart_body(&page);
            Outcome::Chart {
                page: page.context,
                url: page.url,
                items,
            }
        });
    }

    fn spawn_song(&self, tasks: &mut JoinSet<Outcome>, request: Request<ItemRequest>) {
        let client = self.client.clone();
        let semaphore = Arc::clone(&self.semaphore);
        let retry_times = self.config.crawler.retry_times;

        tasks.spawn(async move {
            let page = match fetch(&client, &semaphore, request, retry_times).await {
                Ok(page) => page,
                Err(failed) => return failed,
            };
            let record = parse_song_body(&page);
            Outcome::Song {
                item: page.context,
                url: page.url,
                record,
            }
        });
    }
}

/// Fetches a request while holding one of the concurrency permits
async fn fetch<C>(
    client: &Client,
    semaphore: &Semaphore,
    request: Request<C>,
    retry_times: u32,
) -> Result<Page<C>, Outcome> {
    let _permit = semaphore.acquire().await.map_err(|e| Outcome::Failed {
        url: request.url.clone(),
        error: e.to_string(),
    })?;

    tracing::debug!("Fetching {}", request.url);
    match fetch_page(client, &request.url, retry_times).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
        } => {
            tracing::debug!(
                "Fetched {} (HTTP {}, {} bytes)",
                final_url,
                status_code,
                body.len()
            );
            Ok(Page {
                url: final_url,
                body,
                context: request.context,
            })
        }
        FetchResult::HttpError { status_code } => Err(Outcome::Failed {
            url: request.url,
            error: format!("HTTP {}", status_code),
        }),
        FetchResult::NetworkError { error } => Err(Outcome::Failed {
            url: request.url,
            error,
        }),
    }
}

fn parse_chart_body(page: &Page<ChartPageContext>) -> ParseResult<Vec<ItemRequest>> {
    let document = Html::parse_document(&page.body);
    let items: Vec<ItemRequest> = parse_chart_page(&document, &page.url, page.context)?.collect();
    Ok(items)
}

fn parse_song_body(page: &Page<ItemRequest>) -> ParseResult<SongRecord> {
    let document = Html::parse_document(&page.body);
    parse_song_page(&document, &page.url, &page.context)
}

/// Runs a complete crawl, writing every record to `sink`
///
/// # Example
///
/// ```no_run
/// use kpop_crawler::config::Config;
/// use kpop_crawler::crawler::run_crawl;
/// use kpop_crawler::output::JsonLinesSink;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_crawl(Config::default(), JsonLinesSink::stdout()).await?;
/// println!("{} songs", stats.songs_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S: RecordSink>(
    config: Config,
    sink: S,
) -> Result<CrawlStatistics, CrawlerError> {
    let mut coordinator = Coordinator::new(config, sink)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartPage;
    use crate::output::CollectingSink;

    fn page<C>(url: &str, body: &str, context: C) -> Page<C> {
        Page {
            url: Url::parse(url).unwrap(),
            body: body.to_string(),
            context,
        }
    }

    #[test]
    fn test_coordinator_creation() {
        let coordinator = Coordinator::new(Config::default(), CollectingSink::new()).unwrap();
        assert_eq!(coordinator.stats().songs_emitted, 0);
        assert!(coordinator.into_sink().records.is_empty());
    }

    #[test]
    fn test_coordinator_rejects_bad_base_url() {
        let mut config = Config::default();
        config.chart.base_url = "::not a url::".to_string();
        let result = Coordinator::new(config, CollectingSink::new());
        assert!(matches!(result, Err(CrawlerError::UrlParse(_))));
    }

    #[test]
    fn test_parse_chart_body_uses_final_url() {
        let body = r#"<div class="MnetMusicList"><a class="MMLI_SongInfo" href="track/5">i</a></div>"#;
        let context = ChartPageContext {
            year: 2012,
            page: ChartPage::Second,
        };
        let items = parse_chart_body(&page("http://www.mnet.com/moved/", body, context)).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url.as_str(), "http://www.mnet.com/moved/track/5");
        assert_eq!(items[0].rank, 51);
        assert_eq!(items[0].year, 2012);
    }

    #[test]
    fn test_parse_song_body_carries_context() {
        let body = r#"<dl><dd class="title">Title</dd></dl>
            <div class="line_info"></div>
            <div class="line_info"><b>참여스탭</b></div>"#;
        let item = ItemRequest {
            year: 2013,
            rank: 42,
            url: Url::parse("http://www.mnet.com/track/1").unwrap(),
        };
        let record = parse_song_body(&page("http://www.mnet.com/track/77", body, item)).unwrap();

        assert_eq!(record.year, 2013);
        assert_eq!(record.rank, 42);
        assert_eq!(record.id, 77);
        assert!(record.credits.is_empty());
    }
}
