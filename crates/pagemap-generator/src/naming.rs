//! Sitemap file naming.
//!
//! Shard and index files get fresh names on every run so crawlers and CDNs
//! never serve a stale copy. Names are either random or derived from the
//! file's entries. Uniqueness is probabilistic, collisions are not checked.

use pagemap_core::{PageEntry, config::Naming};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Extension of every generated sitemap file.
pub const SITEMAP_EXTENSION: &str = ".xml";

/// Length of the random suffix.
pub const RANDOM_SUFFIX_LEN: usize = 9;

/// Number of hex digest characters kept for content-hash names.
pub const HASH_SUFFIX_LEN: usize = 12;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates shard and index file names.
#[derive(Debug, Clone)]
pub struct FileNamer {
    naming: Naming,
    prefix: String,
}

impl FileNamer {
    /// Create a namer with the given scheme and prefix.
    #[must_use]
    pub fn new(naming: Naming, prefix: impl Into<String>) -> Self {
        Self {
            naming,
            prefix: prefix.into(),
        }
    }

    /// Name for a shard holding `entries`.
    #[must_use]
    pub fn shard_name(&self, entries: &[PageEntry]) -> String {
        match self.naming {
            Naming::Random => self.random_name(),
            Naming::ContentHash => self.hashed_name(
                entries
                    .iter()
                    .map(|entry| format!("{}\t{}", entry.url, entry.lastmod())),
            ),
        }
    }

    /// Name for an index referencing `locations`.
    #[must_use]
    pub fn index_name(&self, locations: &[String]) -> String {
        match self.naming {
            Naming::Random => self.random_name(),
            Naming::ContentHash => self.hashed_name(locations.iter().cloned()),
        }
    }

    fn random_name(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
            .collect();
        format!("{}{suffix}{SITEMAP_EXTENSION}", self.prefix)
    }

    fn hashed_name(&self, lines: impl Iterator<Item = String>) -> String {
        let mut hasher = Sha256::new();
        for line in lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        let digest = hex::encode(hasher.finalize());
        format!(
            "{}{}{SITEMAP_EXTENSION}",
            self.prefix,
            &digest[..HASH_SUFFIX_LEN]
        )
    }
}
