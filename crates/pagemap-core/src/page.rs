//! Discovered page entries.

use chrono::NaiveDate;

/// A single indexable page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// Path relative to the site root, always `/`-separated.
    pub relative_path: String,

    /// Absolute, percent-encoded URL of the page.
    pub url: String,

    /// Date of the most recent change to the page.
    pub last_modified: NaiveDate,
}

impl PageEntry {
    /// Create a new page entry.
    pub fn new(
        relative_path: impl Into<String>,
        url: impl Into<String>,
        last_modified: NaiveDate,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            url: url.into(),
            last_modified,
        }
    }

    /// Last modification date in sitemap `YYYY-MM-DD` form.
    pub fn lastmod(&self) -> String {
        self.last_modified.format("%Y-%m-%d").to_string()
    }
}
