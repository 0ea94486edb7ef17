//! URL and timestamp mapping.
//!
//! Turns discovered relative paths into [`PageEntry`] values: an absolute
//! percent-encoded URL plus the date the page last changed in git.

use chrono::NaiveDate;
use pagemap_core::{PageEntry, SiteIdentity, VersionControl};
use tracing::{debug, info};

/// Maps relative page paths onto absolute URLs and dates.
#[derive(Debug)]
pub struct PageMapper<'a, V> {
    identity: &'a SiteIdentity,
    history: Option<&'a V>,
    run_date: NaiveDate,
}

/// Pages produced by [`PageMapper::map_all`].
#[derive(Debug, Default)]
pub struct MappedPages {
    /// Entries in input order.
    pub entries: Vec<PageEntry>,

    /// How many entries were stamped with the run date because no history
    /// was available.
    pub fallback_dates: usize,
}

impl<'a, V: VersionControl> PageMapper<'a, V> {
    /// Create a mapper. With `history` set to `None` every page gets
    /// `run_date`.
    #[must_use]
    pub fn new(identity: &'a SiteIdentity, history: Option<&'a V>, run_date: NaiveDate) -> Self {
        Self {
            identity,
            history,
            run_date,
        }
    }

    /// Map a single relative path. The flag reports a date fallback.
    pub fn map(&self, relative_path: &str) -> (PageEntry, bool) {
        let url = self.identity.url_for(&encode_path(relative_path));

        let history_date = self
            .history
            .and_then(|history| history.last_modified(relative_path));

        let (last_modified, fell_back) = match history_date {
            Some(date) => (date, false),
            None => {
                if self.history.is_some() {
                    debug!(path = relative_path, "no git history, using run date");
                }
                (self.run_date, true)
            }
        };

        (PageEntry::new(relative_path, url, last_modified), fell_back)
    }

    /// Map every path, preserving order.
    pub fn map_all<S: AsRef<str>>(&self, paths: &[S]) -> MappedPages {
        let mut mapped = MappedPages {
            entries: Vec::with_capacity(paths.len()),
            fallback_dates: 0,
        };

        for path in paths {
            let (entry, fell_back) = self.map(path.as_ref());
            if fell_back {
                mapped.fallback_dates += 1;
            }
            mapped.entries.push(entry);
        }

        info!(
            pages = mapped.entries.len(),
            fallback_dates = mapped.fallback_dates,
            "mapped pages to URLs"
        );

        mapped
    }
}

/// Percent-encode a `/`-separated path, escaping everything outside the
/// unreserved set while keeping the separators.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pagemap_core::IdentitySource;

    use super::*;

    #[derive(Default)]
    struct FakeHistory {
        dates: HashMap<&'static str, NaiveDate>,
    }

    impl VersionControl for FakeHistory {
        fn remote_url(&self, _remote: &str) -> Option<String> {
            None
        }

        fn last_modified(&self, path: &str) -> Option<NaiveDate> {
            self.dates.get(path).copied()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("sub/b.html"), "sub/b.html");
        assert_eq!(encode_path("my docs/a b.html"), "my%20docs/a%20b.html");
        assert_eq!(encode_path("q&a/100%.html"), "q%26a/100%25.html");
        assert_eq!(encode_path("café.html"), "caf%C3%A9.html");
        assert_eq!(encode_path("a-b_c.d~e.html"), "a-b_c.d~e.html");
    }

    #[test]
    fn test_encoded_url_decodes_to_path() {
        let identity = SiteIdentity::new("https://example.com", IdentitySource::Explicit);
        let mapper = PageMapper::<FakeHistory>::new(&identity, None, date(2024, 1, 1));

        for path in ["a.html", "sub dir/ü.html", "x/#hash?.html"] {
            let (entry, _) = mapper.map(path);
            let encoded = entry.url.strip_prefix("https://example.com/").unwrap();
            assert_eq!(urlencoding::decode(encoded).unwrap(), path);
        }
    }

    #[test]
    fn test_history_date_used_when_available() {
        let identity = SiteIdentity::new("https://example.com", IdentitySource::Explicit);
        let mut history = FakeHistory::default();
        history.dates.insert("a.html", date(2023, 5, 17));

        let mapper = PageMapper::new(&identity, Some(&history), date(2024, 1, 1));
        let (entry, fell_back) = mapper.map("a.html");

        assert_eq!(entry.url, "https://example.com/a.html");
        assert_eq!(entry.last_modified, date(2023, 5, 17));
        assert!(!fell_back);
    }

    #[test]
    fn test_missing_history_falls_back_to_run_date() {
        let identity = SiteIdentity::new("https://example.com", IdentitySource::Explicit);
        let mut history = FakeHistory::default();
        history.dates.insert("a.html", date(2023, 5, 17));

        let mapper = PageMapper::new(&identity, Some(&history), date(2024, 1, 1));
        let mapped = mapper.map_all(&["a.html", "untracked.html", "sub/new.html"]);

        assert_eq!(mapped.entries.len(), 3);
        assert_eq!(mapped.fallback_dates, 2);
        assert_eq!(mapped.entries[1].last_modified, date(2024, 1, 1));
        assert_eq!(mapped.entries[2].relative_path, "sub/new.html");
    }
}
