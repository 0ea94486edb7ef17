//! Build command - generates sitemaps for the site

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr};
use pagemap_core::{Config, GitCli};
use pagemap_generator::Builder;

use super::load_config;

/// Command-line overrides for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Site root to scan.
    pub root: PathBuf,
    /// Output directory override.
    pub output: Option<PathBuf>,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Maximum URLs per sitemap override.
    pub max_urls: Option<usize>,
    /// Skip git history lookups.
    pub no_git_dates: bool,
}

impl BuildOptions {
    /// Options for `root` with no overrides.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Output directory override, with relative paths taken from the site
    /// root the same way `output.dir` is in the config file.
    fn output_dir(&self) -> Option<PathBuf> {
        self.output.as_ref().map(|output| {
            if output.is_absolute() {
                output.clone()
            } else {
                self.root.join(output)
            }
        })
    }

    /// Apply the overrides to a loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            tracing::info!(base_url = %url, "Overriding site base URL from CLI");
            config.site.base_url = Some(url.clone());
        }

        if let Some(max) = self.max_urls {
            tracing::info!(max, "Overriding max URLs per sitemap from CLI");
            config.sitemap.max_urls_per_file = max;
        }

        if self.no_git_dates {
            config.discovery.use_git_dates = false;
        }
    }
}

/// Run the build command.
///
/// Scans the site root and writes the sitemap shards, the index and the
/// location file.
pub fn run(config_path: Option<&Path>, options: &BuildOptions) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?options, "Starting build");

    let mut config = load_config(config_path, &options.root)?;
    options.apply(&mut config);
    config.validate().wrap_err("Invalid configuration")?;

    tracing::debug!(?config, "Loaded configuration");

    let mut builder = Builder::new(config, &options.root);
    if let Some(output) = options.output_dir() {
        builder = builder.with_output_dir(output);
    }

    let git = GitCli::new(&options.root);
    let stats = builder.build(&git).wrap_err("Build failed")?;

    let duration = start.elapsed();

    if stats.pages == 0 {
        println!("No pages found, nothing to index.");
        return Ok(());
    }

    // Print build statistics
    println!();
    println!("  Done: {} pages indexed", stats.pages);
    println!();
    for name in &stats.shard_files {
        println!("  Sitemap:    {name}");
    }
    if let Some(index) = &stats.index_file {
        println!("  Index:      {index}");
    }
    if let Some(path) = &stats.location_file {
        println!("  Location:   {}", path.display());
    }
    if stats.fallback_dates > 0 {
        println!("  Undated:    {} (used today's date)", stats.fallback_dates);
    }
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    if let Some(url) = &stats.index_url {
        println!("  Submit only the index to search engines: {url}");
    }
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let options = BuildOptions {
            base_url: Some("https://example.com".to_string()),
            max_urls: Some(10),
            no_git_dates: true,
            ..BuildOptions::new(".")
        };

        options.apply(&mut config);

        assert_eq!(config.site.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.sitemap.max_urls_per_file, 10);
        assert!(!config.discovery.use_git_dates);
    }

    #[test]
    fn test_run_writes_sitemaps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), "").unwrap();

        let options = BuildOptions {
            base_url: Some("https://example.com".to_string()),
            no_git_dates: true,
            ..BuildOptions::new(dir.path())
        };

        run(None, &options).unwrap();

        let location = std::fs::read_to_string(dir.path().join("sitemap.txt")).unwrap();
        assert!(location.starts_with("Sitemap: https://example.com/m_"));
    }

    #[test]
    fn test_relative_output_is_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".");
        std::fs::write(root.join("a.html"), "").unwrap();

        let options = BuildOptions {
            output: Some(PathBuf::from("maps")),
            base_url: Some("https://example.com".to_string()),
            no_git_dates: true,
            ..BuildOptions::new(&root)
        };
        assert_eq!(options.output_dir(), Some(root.join("maps")));

        run(None, &options).unwrap();

        let location = std::fs::read_to_string(dir.path().join("maps/sitemap.txt")).unwrap();
        assert!(location.starts_with("Sitemap: https://example.com/maps/m_"));
    }

    #[test]
    fn test_run_rejects_zero_max_urls() {
        let dir = tempfile::tempdir().unwrap();
        let options = BuildOptions {
            base_url: Some("https://example.com".to_string()),
            max_urls: Some(0),
            ..BuildOptions::new(dir.path())
        };

        assert!(run(None, &options).is_err());
    }
}
