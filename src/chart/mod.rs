//! Chart scraping module
//!
//! The three steps of a chart crawl, each a plain function over data the
//! caller has already fetched:
//! - Seeding the chart page requests for a year range
//! - Turning a chart page into ranked song requests
//! - Turning a song page into a [`SongRecord`]

mod listing;
mod roles;
mod seeder;
mod song;
mod types;

pub use listing::parse_chart_page;
pub use roles::{assign_roles, clean_tokens, is_markup_artifact, Label, STAFF_HEADER};
pub use seeder::{chart_requests, chart_url};
pub use song::{normalize_duration, parse_song_id, parse_song_page};
pub use types::{
    ChartPage, ChartPageContext, ChartRequest, Credits, ItemRequest, Role, SongRecord,
    RANKS_PER_PAGE,
};

use crate::{ParseError, ParseResult};
use scraper::Selector;

/// Compiles one of the fixed page selectors
fn selector(css: &str) -> ParseResult<Selector> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{:?}: {:?}", css, e)))
}
