//! pagemap Generator Library
//!
//! Page discovery and sitemap generation engine for pagemap.
//!
//! # Modules
//!
//! - [`discover`] - Site tree walk with directory and file exclusions
//! - [`mapper`] - Relative paths to absolute URLs and last-modified dates
//! - [`naming`] - Random or content-hash sitemap file names
//! - [`sitemap`] - Sharding plus sitemap and sitemap index XML
//! - [`announce`] - Plain-text sitemap location file
//! - [`build`] - Pipeline orchestration

pub mod announce;
pub mod build;
pub mod discover;
pub mod mapper;
pub mod naming;
pub mod sitemap;

pub use announce::Announcer;
pub use build::{BuildStats, Builder, SiteSummary};
pub use discover::PageDiscoverer;
pub use mapper::{MappedPages, PageMapper, encode_path};
pub use naming::FileNamer;
pub use sitemap::{SitemapGenerator, SitemapIndex, SitemapShard, partition};
