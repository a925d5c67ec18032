//! Chart page parsing
//!
//! A chart page lists up to fifty songs. Each entry carries a song-info
//! anchor pointing at the song's detail page; the entry's rank is its
//! position in that list.

use crate::chart::selector;
use crate::chart::types::{ChartPageContext, ItemRequest};
use crate::ParseResult;
use scraper::Html;
use url::Url;

/// Song-info anchors inside the chart listing
const SONG_LINK_SELECTOR: &str = r#"div[class*="MnetMusicList"] a[class="MMLI_SongInfo"]"#;

/// Extracts the song detail requests from a chart page
///
/// Ranks come from link order: the i-th link (0-based) on page 1 is rank
/// `i + 1`, on page 2 rank `i + 51`. A page with fewer links yields fewer
/// ranks, and a page with none yields an empty sequence.
///
/// # Arguments
///
/// * `document` - The parsed chart page
/// * `base_url` - The chart page's location, for resolving relative links
/// * `context` - Year and page the chart was fetched for
///
/// # Example
///
/// ```
/// use kpop_crawler::chart::{parse_chart_page, ChartPage, ChartPageContext};
/// use scraper::Html;
/// use url::Url;
///
/// let html =
///     r#"<div class="MnetMusicList"><a class="MMLI_SongInfo" href="/track/42">i</a></div>"#;
/// let document = Html::parse_document(html);
/// let base = Url::parse("http://www.mnet.com/chart/TOP100/2011?pNum=2").unwrap();
/// let context = ChartPageContext { year: 2011, page: ChartPage::Second };
///
/// let items: Vec<_> = parse_chart_page(&document, &base, context).unwrap().collect();
/// assert_eq!(items[0].rank, 51);
/// assert_eq!(items[0].url.as_str(), "http://www.mnet.com/track/42");
/// ```
pub fn parse_chart_page<'a>(
    document: &'a Html,
    base_url: &'a Url,
    context: ChartPageContext,
) -> ParseResult<impl Iterator<Item = ItemRequest> + 'a> {
    let link_selector = selector(SONG_LINK_SELECTOR)?;

    let hrefs: Vec<&'a str> = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .collect();

    Ok(hrefs
        .into_iter()
        .enumerate()
        .filter_map(move |(index, href)| {
            let rank = context.page.rank_at(index);
            match base_url.join(href.trim()) {
                Ok(url) => Some(ItemRequest {
                    year: context.year,
                    rank,
                    url,
                }),
                Err(e) => {
                    tracing::warn!(
                        "Skipping rank {} of {}: cannot resolve {:?}: {}",
                        rank,
                        context.year,
                        href,
                        e
                    );
                    None
                }
            }
        }))
}
