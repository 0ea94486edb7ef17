//! Build orchestration.
//!
//! Runs identity resolution, discovery, mapping, partitioning and
//! serialization in sequence and writes the resulting files.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use chrono::{Local, NaiveDate};
use pagemap_core::{Config, CoreError, SiteIdentity, VersionControl};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    announce::{AnnounceError, Announcer},
    discover::{DiscoverError, PageDiscoverer},
    mapper::PageMapper,
    naming::FileNamer,
    sitemap::{SitemapError, SitemapGenerator, SitemapIndex, SitemapShard, partition},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Identity or configuration error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Discovery error.
    #[error("discovery error: {0}")]
    Discover(#[from] DiscoverError),

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// Location file error.
    #[error("location file error: {0}")]
    Announce(#[from] AnnounceError),

    /// Writing an output file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of pages indexed.
    pub pages: usize,

    /// Sitemap file names, in shard order.
    pub shard_files: Vec<String>,

    /// Index file name, absent when no pages were found.
    pub index_file: Option<String>,

    /// Public URL of the index.
    pub index_url: Option<String>,

    /// Location file written, if any.
    pub location_file: Option<PathBuf>,

    /// Pages dated with the run date for lack of history.
    pub fallback_dates: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Identity and pages of a site, without anything written.
#[derive(Debug, Clone)]
pub struct SiteSummary {
    /// Resolved site identity.
    pub identity: SiteIdentity,

    /// Discovered relative page paths in traversal order.
    pub pages: Vec<String>,
}

/// Sitemap builder that orchestrates the pipeline.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    root: PathBuf,
    output_dir: PathBuf,
    run_date: Option<NaiveDate>,
}

impl Builder {
    /// Create a builder for the site at `root`, writing where the
    /// configuration says (the root by default).
    #[must_use]
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let output_dir = config.output_dir(&root);
        Self {
            config,
            root,
            output_dir,
            run_date: None,
        }
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Pin the run date instead of using today's local date.
    #[must_use]
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    /// Resolve identity and discover pages without writing anything.
    pub fn inspect(&self, vcs: &impl VersionControl) -> Result<SiteSummary> {
        let identity = SiteIdentity::resolve(&self.root, &self.config.site, vcs)?;
        let pages = PageDiscoverer::new(&self.config, &self.root).discover()?;
        Ok(SiteSummary { identity, pages })
    }

    /// Execute the full pipeline.
    ///
    /// Identity resolution runs first, so a fatal identity error leaves the
    /// output directory untouched. Finding no pages is not an error: nothing
    /// is written and the returned stats are empty.
    pub fn build(&self, vcs: &impl VersionControl) -> Result<BuildStats> {
        let start = Instant::now();
        let run_date = self.run_date.unwrap_or_else(|| Local::now().date_naive());

        info!(
            root = %self.root.display(),
            output = %self.output_dir.display(),
            %run_date,
            "starting build"
        );

        // 1. Resolve identity and discover pages
        let SiteSummary { identity, pages } = self.inspect(vcs)?;
        info!(base_url = %identity, source = %identity.source(), "resolved site identity");

        if pages.is_empty() {
            info!("no pages found");
            return Ok(BuildStats {
                duration_ms: elapsed_ms(start),
                ..BuildStats::default()
            });
        }

        // 2. Map paths to URLs and dates
        let history = self.config.discovery.use_git_dates.then_some(vcs);
        let mapped = PageMapper::new(&identity, history, run_date).map_all(&pages);

        // 3. Partition
        let namer = FileNamer::new(self.config.sitemap.naming, &self.config.sitemap.file_prefix);
        let pages_count = mapped.entries.len();
        let shards = partition(mapped.entries, self.config.sitemap.max_urls_per_file, &namer)?;

        // 4. Write shards
        fs::create_dir_all(&self.output_dir)?;
        let generator = SitemapGenerator::new(&self.config.sitemap);
        for shard in &shards {
            self.write_shard(&generator, shard)?;
        }

        // 5. Write index
        let placeholder = SitemapIndex::new(String::new(), &shards, run_date, |name| {
            identity.url_for(&self.public_path(name))
        });
        let index_name = match &self.config.sitemap.index_file {
            Some(name) => name.clone(),
            None => namer.index_name(&placeholder.locations()),
        };
        let index = SitemapIndex {
            file_name: index_name,
            ..placeholder
        };
        self.write_file(&index.file_name, generator.generate_index(&index).as_bytes())?;
        let index_url = identity.url_for(&self.public_path(&index.file_name));

        // 6. Write location file
        let location_file = match self.config.discovery_file() {
            Some(name) => Some(Announcer::new(name).write(&self.output_dir, &index_url)?),
            None => None,
        };

        let stats = BuildStats {
            pages: pages_count,
            shard_files: shards.into_iter().map(|shard| shard.file_name).collect(),
            index_file: Some(index.file_name),
            index_url: Some(index_url),
            location_file,
            fallback_dates: mapped.fallback_dates,
            duration_ms: elapsed_ms(start),
        };

        info!(
            pages = stats.pages,
            shards = stats.shard_files.len(),
            fallback_dates = stats.fallback_dates,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    fn write_shard(&self, generator: &SitemapGenerator, shard: &SitemapShard) -> Result<()> {
        let path = self.output_dir.join(&shard.file_name);
        let file = File::create(&path).map_err(|source| BuildError::Write {
            path: path.clone(),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        generator.write_to(shard, &mut writer)?;
        writer
            .flush()
            .map_err(|source| BuildError::Write { path: path.clone(), source })?;

        debug!(path = %path.display(), urls = shard.entries.len(), "wrote sitemap");
        Ok(())
    }

    fn write_file(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.output_dir.join(name);
        fs::write(&path, content).map_err(|source| BuildError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "wrote file");
        Ok(())
    }

    /// Site-relative path a generated file is served from.
    ///
    /// Both directories are canonicalized first so that differently spelled
    /// paths (`.`, `..`, symlinks) still compare equal. Paths that do not
    /// exist yet are compared as given.
    fn public_path(&self, file_name: &str) -> String {
        let root = canonical(&self.root);
        let output = canonical(&self.output_dir);
        match output.strip_prefix(&root) {
            Ok(relative) if relative.as_os_str().is_empty() => file_name.to_owned(),
            Ok(relative) => format!("{}/{file_name}", slash_path(relative)),
            Err(_) => {
                warn!(
                    output = %self.output_dir.display(),
                    "output directory is outside the site root, assuming it is served at the root"
                );
                file_name.to_owned()
            }
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
