//! Song detail page parsing
//!
//! Extracts the scalar fields from the page header and the contributor
//! credits from the second info block.

use crate::chart::roles::{assign_roles, clean_tokens};
use crate::chart::selector;
use crate::chart::types::{ItemRequest, SongRecord};
use crate::{ParseError, ParseResult};
use scraper::{ElementRef, Html};
use url::Url;

const TITLE_SELECTOR: &str = r#"dd[class="title"]"#;
const DURATION_SELECTOR: &str = r#"dd[class="title"] > span"#;
const ARTIST_SELECTOR: &str = r#"dd[class="title"] > span > a"#;
const INFO_BLOCK_SELECTOR: &str = r#"div[class="line_info"]"#;

/// Position of the song id when the URL is split on runs of `/`
/// (`http:`, host, section, id, ...)
const ID_SEGMENT: usize = 3;

/// Builds a [`SongRecord`] from a song detail page
///
/// # Arguments
///
/// * `document` - The parsed song page
/// * `url` - Final location of the page; the song id is read from it
/// * `item` - The request that led here, supplying year and rank
///
/// # Errors
///
/// * [`ParseError::MalformedIdentifier`] - no numeric id in `url`
/// * [`ParseError::MissingField`] - the page has no title
/// * [`ParseError::MissingStaffHeader`] - the credits block lacks its header
pub fn parse_song_page(document: &Html, url: &Url, item: &ItemRequest) -> ParseResult<SongRecord> {
    let id = parse_song_id(url.as_str())?;

    let title = first_text_of(document, TITLE_SELECTOR)?
        .map(|title| title.trim().to_string())
        .ok_or(ParseError::MissingField("title"))?;

    let duration = first_text_of(document, DURATION_SELECTOR)?.map(|d| normalize_duration(&d));
    let artist = first_text_of(document, ARTIST_SELECTOR)?;

    let tokens = clean_tokens(credit_tokens(document)?)?;
    let credits = assign_roles(tokens);

    Ok(SongRecord {
        year: item.year,
        rank: item.rank,
        id,
        title,
        artist,
        duration,
        credits,
    })
}

/// Reads the song id from a song page location
///
/// # Example
///
/// ```
/// use kpop_crawler::chart::parse_song_id;
///
/// assert_eq!(parse_song_id("http://www.mnet.com/song/12345/detail"), Ok(12345));
/// assert!(parse_song_id("http://www.mnet.com/song").is_err());
/// ```
pub fn parse_song_id(url: &str) -> ParseResult<u64> {
    url.split('/')
        .filter(|segment| !segment.is_empty())
        .nth(ID_SEGMENT)
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| ParseError::MalformedIdentifier {
            url: url.to_string(),
        })
}

/// Removes every parenthesis from a duration such as `(03:45)`
pub fn normalize_duration(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '(' | ')')).collect()
}

/// First text node directly under any element matching `css`
fn first_text_of(document: &Html, css: &str) -> ParseResult<Option<String>> {
    let sel = selector(css)?;
    Ok(document.select(&sel).find_map(first_own_text))
}

fn first_own_text(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .find_map(|child| child.value().as_text().map(|text| String::from(&**text)))
}

/// Raw text of the credits block, in document order
///
/// Only text nested inside child elements counts; text sitting directly in
/// the block is layout whitespace. A page without a second info block has
/// no credits text at all.
fn credit_tokens(document: &Html) -> ParseResult<Vec<String>> {
    let sel = selector(INFO_BLOCK_SELECTOR)?;
    let Some(block) = document.select(&sel).nth(1) else {
        return Ok(Vec::new());
    };

    Ok(block
        .descendants()
        .filter(|node| node.parent().map(|parent| parent.id()) != Some(block.id()))
        .filter_map(|node| node.value().as_text().map(|text| String::from(&**text)))
        .collect())
}
