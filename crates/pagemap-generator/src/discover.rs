//! Page discovery.
//!
//! Walks the site tree depth-first and collects the relative paths of every
//! indexable page, pruning excluded and hidden directories before descending.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use pagemap_core::Config;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Page discovery errors.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The site root could not be read.
    #[error("cannot read site root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The site root is not a directory.
    #[error("site root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoverError>;

/// Collects page paths under a site root.
#[derive(Debug)]
pub struct PageDiscoverer {
    root: PathBuf,
    page_suffix: String,
    excluded_dirs: HashSet<String>,
    excluded_files: HashSet<String>,
}

impl PageDiscoverer {
    /// Create a discoverer for `root` using the configured exclusion rules.
    #[must_use]
    pub fn new(config: &Config, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_suffix: config.page_suffix(),
            excluded_dirs: config.discovery.excluded_dirs.iter().cloned().collect(),
            excluded_files: config.discovery.excluded_files.iter().cloned().collect(),
        }
    }

    /// Discover pages in traversal order.
    ///
    /// Paths are relative to the root and `/`-separated. No sorting is
    /// applied, so the order follows the directory listing of the host
    /// filesystem.
    pub fn discover(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(DiscoverError::NotADirectory(self.root.clone()));
        }

        info!(root = %self.root.display(), "discovering pages");

        let mut pages = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| !self.is_pruned(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(DiscoverError::Root {
                        path: self.root.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !is_file(&entry) || !self.is_page(&entry) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                warn!(path = %entry.path().display(), "page outside site root");
                continue;
            };
            let Some(relative) = slash_relative(relative) else {
                warn!(path = %entry.path().display(), "skipping page with a non UTF-8 name");
                continue;
            };

            trace!(path = %relative, "found page");
            pages.push(relative);
        }

        debug!(count = pages.len(), "discovery finished");
        Ok(pages)
    }

    /// Whether a directory is skipped along with its whole subtree.
    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        let pruned = name.starts_with('.') || self.excluded_dirs.contains(&*name);
        if pruned {
            debug!(dir = %entry.path().display(), "pruning directory");
        }
        pruned
    }

    /// Whether a file name qualifies as an indexable page.
    fn is_page(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        name.ends_with(&self.page_suffix) && !self.excluded_files.contains(&*name)
    }

}

/// Join the components of a relative path with `/`. `None` when any
/// component is not valid UTF-8, since such a name has no URL form.
fn slash_relative(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(normalize_relative(&parts.join("/")))
}

/// Regular files, plus symlinks that point at regular files.
fn is_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Normalize a relative path: backslashes become `/` and any leading `./`
/// is removed.
#[must_use]
pub fn normalize_relative(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_owned();
    }
    normalized.trim_start_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "<html></html>").unwrap();
    }

    fn discover_sorted(root: &Path, config: &Config) -> Vec<String> {
        let mut pages = PageDiscoverer::new(config, root).discover().unwrap();
        pages.sort();
        pages
    }

    #[test]
    fn test_discovers_nested_pages() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.html");
        touch(dir.path(), "sub/b.html");
        touch(dir.path(), "sub/deeper/c.html");
        touch(dir.path(), "notes.txt");

        let pages = discover_sorted(dir.path(), &Config::default());

        assert_eq!(pages, vec!["a.html", "sub/b.html", "sub/deeper/c.html"]);
    }

    #[test]
    fn test_excluded_and_hidden_dirs_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.html");
        touch(dir.path(), "assets/c.html");
        touch(dir.path(), "assets/nested/d.html");
        touch(dir.path(), ".cache/e.html");
        touch(dir.path(), "blog/.drafts/f.html");

        let pages = discover_sorted(dir.path(), &Config::default());

        assert_eq!(pages, vec!["a.html"]);
    }

    #[test]
    fn test_excluded_files_dropped_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "index.html");
        touch(dir.path(), "404.html");
        touch(dir.path(), "docs/index.html");
        touch(dir.path(), "docs/guide.html");

        let pages = discover_sorted(dir.path(), &Config::default());

        assert_eq!(pages, vec!["docs/guide.html"]);
    }

    #[test]
    fn test_custom_extension_and_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.htm");
        touch(dir.path(), "b.html");
        touch(dir.path(), "drafts/c.htm");

        let mut config = Config::default();
        config.discovery.page_extension = "htm".to_string();
        config.discovery.excluded_dirs = vec!["drafts".to_string()];

        let pages = discover_sorted(dir.path(), &config);

        assert_eq!(pages, vec!["a.htm"]);
    }

    #[test]
    fn test_empty_site() {
        let dir = tempfile::tempdir().unwrap();
        let pages = PageDiscoverer::new(&Config::default(), dir.path())
            .discover()
            .unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PageDiscoverer::new(&Config::default(), dir.path().join("nope")).discover();
        assert!(matches!(result, Err(DiscoverError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.html");
        let bad = OsStr::from_bytes(b"bad\xff.html");
        fs::write(dir.path().join(bad), "<html></html>").unwrap();
        fs::create_dir_all(dir.path().join(OsStr::from_bytes(b"dir\xfe"))).unwrap();
        fs::write(
            dir.path().join(OsStr::from_bytes(b"dir\xfe")).join("b.html"),
            "<html></html>",
        )
        .unwrap();

        let pages = discover_sorted(dir.path(), &Config::default());

        assert_eq!(pages, vec!["a.html"]);
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("./a.html"), "a.html");
        assert_eq!(normalize_relative("sub\\b.html"), "sub/b.html");
        assert_eq!(normalize_relative("././x/y.html"), "x/y.html");
        assert_eq!(normalize_relative(".well-known/z.html"), ".well-known/z.html");
    }
}
