//! Contributor credit scanning
//!
//! The credits block on a song page is a flat run of text: a label such as
//! `작사` followed by the names it applies to, then the next label. The scan
//! below walks that run once, carrying the most recent label as it goes.

use crate::chart::types::{Credits, Role};
use crate::{ParseError, ParseResult};

/// Section header that precedes the credits
pub const STAFF_HEADER: &str = "참여스탭";

/// Whitespace runs and entity text left over from the page markup
///
/// The pages write a bare `&nbsp` between names. The HTML parser decodes it
/// to U+00A0, and a double-escaped one survives as literal `&nbsp`.
const MARKUP_ARTIFACTS: [&str; 4] = ["\r\n\t\t", "\n\t\t", "&nbsp", "\u{a0}"];

/// Labels that delimit credits without having an output field
const IGNORED_LABELS: [&str; 5] = ["일렉트릭 기타", "피아노", "나래이션", "코러스", "랩"];

/// A token that switches the scan to a new section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Role(Role),
    Ignored,
}

impl Role {
    /// Maps a credits label from the page to its role
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "보컬" => Some(Self::Vocals),
            "피쳐링" => Some(Self::Featuring),
            "작사" => Some(Self::Lyricist),
            "작곡" => Some(Self::Composer),
            "편곡" => Some(Self::Arranger),
            "프로듀서" => Some(Self::Producer),
            _ => None,
        }
    }
}

impl Label {
    /// Classifies a token, returning `None` for data tokens
    pub fn parse(token: &str) -> Option<Self> {
        Role::from_label(token)
            .map(Label::Role)
            .or_else(|| IGNORED_LABELS.contains(&token).then_some(Label::Ignored))
    }
}

/// True for text nodes that are formatting residue rather than data
pub fn is_markup_artifact(token: &str) -> bool {
    MARKUP_ARTIFACTS
        .iter()
        .any(|artifact| token.contains(artifact))
}

/// Drops markup artifacts and the staff header from the raw credits text
///
/// Exactly one occurrence of [`STAFF_HEADER`] is removed. A block without it
/// does not have the expected shape and is rejected.
pub fn clean_tokens<I, S>(raw: I) -> ParseResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens: Vec<String> = raw
        .into_iter()
        .map(Into::into)
        .filter(|token| !is_markup_artifact(token))
        .collect();

    let header = tokens
        .iter()
        .position(|token| token == STAFF_HEADER)
        .ok_or(ParseError::MissingStaffHeader)?;
    tokens.remove(header);

    Ok(tokens)
}

/// Assigns each data token to the role label most recently seen before it
///
/// Tokens that follow an ignored label, or that come before any label, are
/// dropped.
///
/// # Example
///
/// ```
/// use kpop_crawler::chart::assign_roles;
///
/// let credits = assign_roles(["보컬", "Alice", "코러스", "Carol", "작곡", "Dan"]);
/// assert_eq!(credits.vocals, vec!["Alice"]);
/// assert_eq!(credits.composer, vec!["Dan"]);
/// ```
pub fn assign_roles<I, S>(tokens: I) -> Credits
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (_, credits) = tokens.into_iter().fold(
        (None, Credits::default()),
        |(current, mut credits): (Option<Label>, Credits), token| {
            let token = token.as_ref();
            if let Some(label) = Label::parse(token) {
                return (Some(label), credits);
            }
            if let Some(Label::Role(role)) = current {
                credits.names_mut(role).push(token.to_string());
            }
            (current, credits)
        },
    );
    credits
}
