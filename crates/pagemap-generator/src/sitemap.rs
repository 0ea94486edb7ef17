//! Sitemap partitioning and XML generation.
//!
//! Splits the page list into bounded shards and renders each shard as a
//! sitemaps.org `<urlset>` plus one `<sitemapindex>` referencing them all.

use std::io::Write;

use chrono::NaiveDate;
use pagemap_core::{
    PageEntry,
    config::{ChangeFreq, SitemapConfig},
};
use thiserror::Error;
use tracing::debug;

use crate::naming::FileNamer;

/// Namespace of sitemap and sitemap index documents.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shards must hold at least one URL.
    #[error("invalid shard size: {0}")]
    ShardSize(usize),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// One sitemap file worth of pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapShard {
    /// Generated file name.
    pub file_name: String,

    /// Pages in input order, never empty.
    pub entries: Vec<PageEntry>,
}

/// An index entry pointing at one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Absolute URL of the shard.
    pub loc: String,

    /// Generation date of the run.
    pub lastmod: NaiveDate,
}

/// The sitemap index of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapIndex {
    /// File name of the index itself.
    pub file_name: String,

    /// One entry per shard, in shard order.
    pub entries: Vec<IndexEntry>,
}

impl SitemapIndex {
    /// Build an index referencing `shards`, all stamped with `run_date`.
    ///
    /// `locate` turns a shard file name into its public URL.
    pub fn new(
        file_name: impl Into<String>,
        shards: &[SitemapShard],
        run_date: NaiveDate,
        locate: impl Fn(&str) -> String,
    ) -> Self {
        let entries = shards
            .iter()
            .map(|shard| IndexEntry {
                loc: locate(&shard.file_name),
                lastmod: run_date,
            })
            .collect();

        Self {
            file_name: file_name.into(),
            entries,
        }
    }

    /// Public URLs of every referenced shard.
    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.loc.clone()).collect()
    }
}

/// Split `entries` into consecutive shards of at most `max_per_shard` pages.
///
/// Order is preserved and nothing is dropped; only the last shard may be
/// smaller. An empty input yields no shards.
pub fn partition(
    entries: Vec<PageEntry>,
    max_per_shard: usize,
    namer: &FileNamer,
) -> Result<Vec<SitemapShard>> {
    if max_per_shard == 0 {
        return Err(SitemapError::ShardSize(max_per_shard));
    }

    let mut shards = Vec::with_capacity(entries.len().div_ceil(max_per_shard));
    let mut remaining = entries.into_iter().peekable();

    while remaining.peek().is_some() {
        let chunk: Vec<PageEntry> = remaining.by_ref().take(max_per_shard).collect();
        shards.push(SitemapShard {
            file_name: namer.shard_name(&chunk),
            entries: chunk,
        });
    }

    debug!(shards = shards.len(), max_per_shard, "partitioned pages");
    Ok(shards)
}

/// Renders shards and indexes as XML.
#[derive(Debug, Clone, Default)]
pub struct SitemapGenerator {
    changefreq: Option<ChangeFreq>,
    priority: Option<f32>,
}

impl SitemapGenerator {
    /// Create a new sitemap generator.
    #[must_use]
    pub fn new(config: &SitemapConfig) -> Self {
        Self {
            changefreq: config.changefreq,
            priority: config.priority,
        }
    }

    /// Generate sitemap XML for one shard.
    #[must_use]
    pub fn generate(&self, shard: &SitemapShard) -> String {
        debug!(file = %shard.file_name, count = shard.entries.len(), "generating sitemap");

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in &shard.entries {
            xml.push_str(&self.url_to_xml(entry));
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Convert a page entry to a `<url>` element.
    fn url_to_xml(&self, entry: &PageEntry) -> String {
        let mut xml = String::from("  <url>\n");

        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod()));

        if let Some(changefreq) = &self.changefreq {
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                changefreq.as_str()
            ));
        }

        if let Some(priority) = &self.priority {
            xml.push_str(&format!("    <priority>{priority}</priority>\n"));
        }

        xml.push_str("  </url>\n");
        xml
    }

    /// Write a shard's sitemap to a writer.
    pub fn write_to<W: Write>(&self, shard: &SitemapShard, writer: &mut W) -> Result<()> {
        let xml = self.generate(shard);
        writer.write_all(xml.as_bytes())?;
        Ok(())
    }

    /// Generate the sitemap index XML.
    #[must_use]
    pub fn generate_index(&self, index: &SitemapIndex) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<sitemapindex xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in &index.entries {
            xml.push_str("  <sitemap>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                entry.lastmod.format("%Y-%m-%d")
            ));
            xml.push_str("  </sitemap>\n");
        }

        xml.push_str("</sitemapindex>\n");
        xml
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
