//! Requests, fetched pages and duplicate filtering
//!
//! Every request carries an opaque context that comes back unchanged with
//! the fetched page, so parsers know which year, page or rank they are
//! looking at without any shared state.

use std::collections::HashSet;
use url::Url;

/// A location to fetch plus the context to hand back with its page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<C> {
    pub url: Url,
    pub context: C,
    /// Skip the duplicate filter for this request
    pub dont_filter: bool,
}

impl<C> Request<C> {
    pub fn new(url: Url, context: C) -> Self {
        Self {
            url,
            context,
            dont_filter: false,
        }
    }

    /// Marks the request as exempt from duplicate filtering
    ///
    /// The same song page legitimately shows up at several ranks and years,
    /// so song requests are always sent.
    pub fn dont_filter(mut self) -> Self {
        self.dont_filter = true;
        self
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Page<C> {
    /// Final location after redirects
    pub url: Url,
    pub body: String,
    pub context: C,
}

/// Remembers which URLs have already been requested
#[derive(Debug, Default)]
pub struct RequestFilter {
    seen: HashSet<String>,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the request should be sent
    ///
    /// Requests marked `dont_filter` are always admitted and are not
    /// remembered; any other request is admitted only the first time its
    /// URL is seen.
    pub fn admit<C>(&mut self, request: &Request<C>) -> bool {
        if request.dont_filter {
            return true;
        }
        self.seen.insert(request.url.as_str().to_string())
    }

    /// Number of distinct URLs remembered
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
