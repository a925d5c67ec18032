use serde::Serialize;
use std::fmt;
use url::Url;

/// Number of ranks listed on one chart page
pub const RANKS_PER_PAGE: u32 = 50;

/// One of the two pages of a yearly TOP100 chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartPage {
    /// Ranks 1-50
    First,
    /// Ranks 51-100
    Second,
}

impl ChartPage {
    /// All chart pages, in fetch order
    pub const ALL: [ChartPage; 2] = [ChartPage::First, ChartPage::Second];

    /// The `pNum` value used in the chart URL
    pub fn number(&self) -> u32 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    /// Rank of the first entry on this page, minus one
    pub fn rank_offset(&self) -> u32 {
        (self.number() - 1) * RANKS_PER_PAGE
    }

    /// Rank of the entry at `index` (0-based) within this page's listing
    pub fn rank_at(&self, index: usize) -> u32 {
        self.rank_offset() + index as u32 + 1
    }
}

impl fmt::Display for ChartPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A chart page location to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub year: i32,
    pub page: ChartPage,
    pub url: Url,
}

impl ChartRequest {
    /// The context that travels with this request through the fetcher
    pub fn context(&self) -> ChartPageContext {
        ChartPageContext {
            year: self.year,
            page: self.page,
        }
    }
}

/// Context attached to a chart page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartPageContext {
    pub year: i32,
    pub page: ChartPage,
}

/// A song detail page to fetch, with the rank it holds on the chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequest {
    pub year: i32,
    pub rank: u32,
    pub url: Url,
}

/// Contributor role with an output field on [`SongRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Vocals,
    Featuring,
    Lyricist,
    Composer,
    Arranger,
    Producer,
}

/// Contributor credits grouped by role, in page order within each role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credits {
    pub vocals: Vec<String>,
    pub featuring: Vec<String>,
    pub composer: Vec<String>,
    pub lyricist: Vec<String>,
    pub arranger: Vec<String>,
    pub producer: Vec<String>,
}

impl Credits {
    /// Mutable access to the list backing `role`
    pub fn names_mut(&mut self, role: Role) -> &mut Vec<String> {
        match role {
            Role::Vocals => &mut self.vocals,
            Role::Featuring => &mut self.featuring,
            Role::Lyricist => &mut self.lyricist,
            Role::Composer => &mut self.composer,
            Role::Arranger => &mut self.arranger,
            Role::Producer => &mut self.producer,
        }
    }

    /// The names credited under `role`
    pub fn names(&self, role: Role) -> &[String] {
        match role {
            Role::Vocals => &self.vocals,
            Role::Featuring => &self.featuring,
            Role::Lyricist => &self.lyricist,
            Role::Composer => &self.composer,
            Role::Arranger => &self.arranger,
            Role::Producer => &self.producer,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vocals.is_empty()
            && self.featuring.is_empty()
            && self.composer.is_empty()
            && self.lyricist.is_empty()
            && self.arranger.is_empty()
            && self.producer.is_empty()
    }
}

/// Everything extracted for one chart entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongRecord {
    pub year: i32,
    pub rank: u32,
    pub id: u64,
    pub title: String,
    pub artist: Option<String>,
    pub duration: Option<String>,
    #[serde(flatten)]
    pub credits: Credits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers() {
        assert_eq!(ChartPage::First.number(), 1);
        assert_eq!(ChartPage::Second.number(), 2);
        assert_eq!(ChartPage::Second.to_string(), "2");
    }

    #[test]
    fn test_rank_at() {
        assert_eq!(ChartPage::First.rank_at(0), 1);
        assert_eq!(ChartPage::First.rank_at(49), 50);
        assert_eq!(ChartPage::Second.rank_at(0), 51);
        assert_eq!(ChartPage::Second.rank_at(49), 100);
    }

    #[test]
    fn test_credits_roles_map_to_fields() {
        let mut credits = Credits::default();
        assert!(credits.is_empty());

        credits.names_mut(Role::Lyricist).push("Bob".to_string());
        assert_eq!(credits.lyricist, vec!["Bob".to_string()]);
        assert_eq!(credits.names(Role::Lyricist), ["Bob".to_string()]);
        assert!(credits.names(Role::Composer).is_empty());
        assert!(!credits.is_empty());
    }

    #[test]
    fn test_song_record_serializes_flat() {
        let mut credits = Credits::default();
        credits.vocals.push("Alice".to_string());
        let record = SongRecord {
            year: 2011,
            rank: 3,
            id: 12345,
            title: "Song".to_string(),
            artist: None,
            duration: Some("03:45".to_string()),
            credits,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["year"], 2011);
        assert_eq!(value["rank"], 3);
        assert_eq!(value["id"], 12345);
        assert_eq!(value["artist"], serde_json::Value::Null);
        assert_eq!(value["duration"], "03:45");
        assert_eq!(value["vocals"][0], "Alice");
        assert_eq!(value["producer"].as_array().unwrap().len(), 0);
        assert!(value.get("credits").is_none());
    }
}
