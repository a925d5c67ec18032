//! Chart request seeding

use crate::chart::types::{ChartPage, ChartRequest};
use url::Url;

/// Path of a yearly chart page, relative to the site root
const CHART_PATH_TEMPLATE: &str = "/chart/TOP100/{year}?pNum={page}";

/// Builds the location of one chart page
///
/// # Arguments
///
/// * `base_url` - Site root, e.g. `http://www.mnet.com`
/// * `year` - Chart year
/// * `page` - Which half of the chart
pub fn chart_url(base_url: &Url, year: i32, page: ChartPage) -> Result<Url, url::ParseError> {
    let path = CHART_PATH_TEMPLATE
        .replace("{year}", &year.to_string())
        .replace("{page}", &page.number().to_string());
    base_url.join(&path)
}

/// Builds every chart request for the inclusive year range
///
/// Requests are ordered by year ascending, then page 1 before page 2.
/// An empty range (`start_year > end_year`) yields no requests.
///
/// # Example
///
/// ```
/// use kpop_crawler::chart::chart_requests;
/// use url::Url;
///
/// let base = Url::parse("http://www.mnet.com").unwrap();
/// let requests = chart_requests(&base, 2011, 2012);
/// assert_eq!(requests.len(), 4);
/// assert_eq!(requests[0].url.as_str(), "http://www.mnet.com/chart/TOP100/2011?pNum=1");
/// ```
pub fn chart_requests(base_url: &Url, start_year: i32, end_year: i32) -> Vec<ChartRequest> {
    (start_year..=end_year)
        .flat_map(|year| ChartPage::ALL.into_iter().map(move |page| (year, page)))
        .filter_map(|(year, page)| match chart_url(base_url, year, page) {
            Ok(url) => Some(ChartRequest { year, page, url }),
            Err(e) => {
                // The path template is fixed, so this only happens with an unusable base URL
                tracing::warn!("Cannot build chart URL for {} page {}: {}", year, page, e);
                None
            }
        })
        .collect()
}
