//! pagemap Core Library
//!
//! Core types, configuration, site identity and error handling for the pagemap
//! sitemap generator.

pub mod config;
pub mod error;
pub mod git;
pub mod identity;
pub mod page;

pub use crate::config::Config;
pub use error::{CoreError, Result};
pub use git::{GitCli, VersionControl};
pub use identity::{IdentitySource, SiteIdentity};
pub use page::PageEntry;
