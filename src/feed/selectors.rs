use serde::{Deserialize, Serialize};

/// CSS selectors describing how to walk one feed
///
/// Every reader derived from a feed shares the same selectors; pagination only
/// changes the URL and the remaining depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    /// Selector for the "next page" link on a listing page
    pub next: String,

    /// Selector for entry page links on a listing page
    pub entries: String,

    /// Selector for article links on an entry page
    pub links: String,
}

impl Selectors {
    pub fn new(next: impl Into<String>, entries: impl Into<String>, links: impl Into<String>) -> Self {
        Self {
            next: next.into(),
            entries: entries.into(),
            links: links.into(),
        }
    }
}
