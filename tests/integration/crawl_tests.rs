//! Integration tests for the crawler
//!
//! These tests use wiremock to serve chart and song pages and run the full
//! crawl cycle end-to-end.

use kpop_crawler::config::{ChartConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use kpop_crawler::crawler::{run_crawl, Coordinator};
use kpop_crawler::output::{CollectingSink, JsonLinesSink};
use kpop_crawler::SongRecord;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the 2011 chart on `base_url`
fn create_test_config(base_url: &str) -> Config {
    Config {
        chart: ChartConfig {
            start_year: 2011,
            end_year: 2011,
            base_url: base_url.to_string(),
        },
        crawler: CrawlerConfig {
            max_concurrent_requests: 4,
            retry_times: 2,
            request_timeout: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig::default(),
    }
}

/// A chart listing with one song-info link per entry
fn chart_page(song_paths: &[&str]) -> String {
    let rows: String = song_paths
        .iter()
        .map(|p| {
            format!(
                r#"<li><div class="MMLITitle_Box"><a class="MMLI_Song" href="{p}">t</a></div>
                <a class="MMLI_SongInfo" href="{p}">곡정보</a></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="MnetMusicList MnetMusicListChart"><ul>{rows}</ul></div></body></html>"#
    )
}

/// A song detail page with the given header and credits markup
fn song_page(title: &str, credits: &str) -> String {
    format!(
        r#"<html><body>
        <div class="music_info"><dl>
            <dd class="title">{title}<span>(03:21) <a href="/artist/9">Artist {title}</a></span></dd>
        </dl></div>
        <div class="line_info"><span>발매일</span><span>2011.01.01</span></div>
        <div class="line_info">
        <h4>참여스탭</h4>
        <dl>{credits}</dl>
        </div>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_chart(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/chart/TOP100/2011"))
        .and(query_param("pNum", page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_song(server: &MockServer, song_path: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(song_path))
        .respond_with(html(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn crawl(server: &MockServer) -> (Vec<SongRecord>, kpop_crawler::output::CrawlStatistics) {
    let config = create_test_config(&server.uri());
    let mut coordinator =
        Coordinator::new(config, CollectingSink::new()).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");
    (coordinator.into_sink().sorted(), stats)
}

#[tokio::test]
async fn test_full_crawl_single_year() {
    let mock_server = MockServer::start().await;

    mount_chart(
        &mock_server,
        "1",
        chart_page(&["/track/101", "/track/102", "/track/103"]),
    )
    .await;
    // The same song re-enters the chart further down: it must be fetched again
    mount_chart(&mock_server, "2", chart_page(&["/track/201", "/track/101"])).await;

    mount_song(
        &mock_server,
        "/track/101",
        song_page(
            "Roly-Poly",
            "<dt>보컬</dt><dd><a>지연</a><a>효민</a></dd><dt>작곡</dt><dd><a>최규성</a></dd>",
        ),
        2,
    )
    .await;
    mount_song(
        &mock_server,
        "/track/102",
        song_page("Lonely", "<dt>작사</dt><dd><a>방시혁</a></dd>"),
        1,
    )
    .await;
    mount_song(
        &mock_server,
        "/track/103",
        song_page(
            "Jumping",
            "<dt>피쳐링</dt><dd><a>MC</a></dd><dt>랩</dt><dd><a>Rapper</a></dd>",
        ),
        1,
    )
    .await;
    mount_song(
        &mock_server,
        "/track/201",
        song_page(
            "Trouble Maker",
            "<dt>프로듀서</dt><dd><a>용감한형제</a></dd><dt>편곡</dt><dd><a>Kim</a></dd>",
        ),
        1,
    )
    .await;

    let (records, stats) = crawl(&mock_server).await;

    let ranks: Vec<(u32, u64)> = records.iter().map(|r| (r.rank, r.id)).collect();
    assert_eq!(ranks, vec![(1, 101), (2, 102), (3, 103), (51, 201), (52, 101)]);
    assert!(records.iter().all(|r| r.year == 2011));

    let first = &records[0];
    assert_eq!(first.title, "Roly-Poly");
    assert_eq!(first.artist.as_deref(), Some("Artist Roly-Poly"));
    assert_eq!(first.duration.as_deref(), Some("03:21 "));
    assert_eq!(first.credits.vocals, vec!["지연", "효민"]);
    assert_eq!(first.credits.composer, vec!["최규성"]);

    assert_eq!(records[1].credits.lyricist, vec!["방시혁"]);
    assert_eq!(records[2].credits.featuring, vec!["MC"]);
    assert_eq!(records[3].credits.producer, vec!["용감한형제"]);
    assert_eq!(records[3].credits.arranger, vec!["Kim"]);
    assert_eq!(records[4].title, "Roly-Poly");

    assert_eq!(stats.chart_pages_fetched, 2);
    assert_eq!(stats.song_pages_fetched, 5);
    assert_eq!(stats.songs_emitted, 5);
    assert_eq!(stats.songs_dropped, 0);
    assert_eq!(stats.duplicates_filtered, 0);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_bad_song_pages_are_dropped() {
    let mock_server = MockServer::start().await;

    mount_chart(
        &mock_server,
        "1",
        chart_page(&["/track/1", "/track/2", "/track/3", "/track/4"]),
    )
    .await;
    mount_chart(&mock_server, "2", chart_page(&[])).await;

    mount_song(
        &mock_server,
        "/track/1",
        song_page("Fine", "<dt>보컬</dt><dd><a>Alice</a></dd>"),
        1,
    )
    .await;
    // No title
    mount_song(
        &mock_server,
        "/track/2",
        concat!(
            r#"<html><body><div class="line_info"></div>"#,
            r#"<div class="line_info"><h4>참여스탭</h4></div></body></html>"#,
        )
        .to_string(),
        1,
    )
    .await;
    // No staff header
    mount_song(
        &mock_server,
        "/track/3",
        r#"<html><body><dl><dd class="title">Headless</dd></dl></body></html>"#.to_string(),
        1,
    )
    .await;
    // Server error on every attempt: first try plus two retries
    Mock::given(method("GET"))
        .and(path("/track/4"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (records, stats) = crawl(&mock_server).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rank, 1);
    assert_eq!(records[0].credits.vocals, vec!["Alice"]);

    assert_eq!(stats.chart_pages_fetched, 2);
    assert_eq!(stats.song_pages_fetched, 3);
    assert_eq!(stats.songs_emitted, 1);
    assert_eq!(stats.songs_dropped, 2);
    assert_eq!(stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_transient_chart_failure_is_retried() {
    let mock_server = MockServer::start().await;

    // First request for page 1 fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/chart/TOP100/2011"))
        .and(query_param("pNum", "1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_chart(&mock_server, "1", chart_page(&["/track/7"])).await;
    mount_chart(&mock_server, "2", chart_page(&[])).await;

    mount_song(
        &mock_server,
        "/track/7",
        song_page("Retry", "<dt>편곡</dt><dd><a>Arr</a></dd>"),
        1,
    )
    .await;

    let (records, stats) = crawl(&mock_server).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 7);
    assert_eq!(records[0].credits.arranger, vec!["Arr"]);
    assert_eq!(stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_missing_chart_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    mount_chart(&mock_server, "1", chart_page(&["/track/11"])).await;
    // 404 is not retried
    Mock::given(method("GET"))
        .and(path("/chart/TOP100/2011"))
        .and(query_param("pNum", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_song(
        &mock_server,
        "/track/11",
        song_page("Survivor", "<dt>작사</dt><dd><a>Writer</a></dd>"),
        1,
    )
    .await;

    let (records, stats) = crawl(&mock_server).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rank, 1);
    assert_eq!(stats.chart_pages_fetched, 1);
    assert_eq!(stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_crawl_writes_json_lines() {
    let mock_server = MockServer::start().await;

    mount_chart(&mock_server, "1", chart_page(&["/track/5", "/track/6"])).await;
    mount_chart(&mock_server, "2", chart_page(&["/track/5"])).await;
    mount_song(
        &mock_server,
        "/track/5",
        song_page("Five", "<dt>보컬</dt><dd><a>V</a></dd>"),
        2,
    )
    .await;
    mount_song(&mock_server, "/track/6", song_page("Six", ""), 1).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let items_path = dir.path().join("songs.jsonl");

    let config = create_test_config(&mock_server.uri());
    let sink = JsonLinesSink::create(&items_path).expect("Failed to create sink");
    let stats = run_crawl(config, sink).await.expect("Crawl failed");
    assert_eq!(stats.songs_emitted, 3);

    let content = std::fs::read_to_string(&items_path).expect("Failed to read output");
    let mut rows: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect();
    rows.sort_by_key(|row| row["rank"].as_u64());

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["id"], 5);
    assert_eq!(rows[0]["title"], "Five");
    assert_eq!(rows[0]["vocals"][0], "V");
    assert_eq!(rows[1]["rank"], 2);
    assert_eq!(rows[1]["title"], "Six");
    assert_eq!(rows[1]["duration"], "03:21 ");
    assert_eq!(rows[2]["rank"], 51);
    assert_eq!(rows[2]["id"], 5);
    assert_eq!(rows[2]["year"], 2011);
}
