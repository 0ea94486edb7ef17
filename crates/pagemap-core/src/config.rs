//! Run configuration.
//!
//! One [`Config`] value is built at process start (defaults, then an optional
//! TOML file, then `PAGEMAP__*` environment variables) and handed to every
//! pipeline stage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Upper bound on URLs per sitemap file set by the sitemaps.org protocol.
pub const PROTOCOL_MAX_URLS: usize = 50_000;

/// Main configuration structure for pagemap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How the site's base URL is resolved.
    #[serde(default)]
    pub site: SiteConfig,

    /// Page discovery rules.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Sitemap sharding and serialization settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Site identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Explicit base URL (e.g., "https://example.com"). Skips all detection.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Custom-domain marker file, relative to the site root.
    #[serde(default = "default_custom_domain_file")]
    pub custom_domain_file: String,

    /// Treat a missing or empty custom-domain file as fatal instead of
    /// falling back to the git remote.
    #[serde(default)]
    pub require_custom_domain: bool,

    /// Git remote used to derive the hosted URL.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Pages hosting domain, the owner becomes its subdomain.
    #[serde(default = "default_hosting_domain")]
    pub hosting_domain: String,
}

/// Page discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Extension (without dot) of files considered pages.
    #[serde(default = "default_page_extension")]
    pub page_extension: String,

    /// Directory names pruned from the walk.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// File names never listed, at any depth.
    #[serde(default = "default_excluded_files")]
    pub excluded_files: Vec<String>,

    /// Look up last-modified dates in git history.
    #[serde(default = "default_true")]
    pub use_git_dates: bool,
}

/// How sitemap and index files are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Naming {
    /// Prefix plus a random lowercase alphanumeric suffix.
    #[default]
    Random,
    /// Prefix plus a digest of the file's entries.
    ContentHash,
}

/// Change frequency for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    /// Value written into `<changefreq>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

/// Sitemap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Maximum number of URLs per sitemap file.
    #[serde(default = "default_max_urls_per_file")]
    pub max_urls_per_file: usize,

    /// File naming scheme for shards (and the index unless `index_file` is set).
    #[serde(default)]
    pub naming: Naming,

    /// Prefix of generated file names.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Fixed index file name; generated when absent.
    #[serde(default)]
    pub index_file: Option<String>,

    /// `<changefreq>` applied to every entry.
    #[serde(default)]
    pub changefreq: Option<ChangeFreq>,

    /// `<priority>` applied to every entry (0.0 to 1.0).
    #[serde(default)]
    pub priority: Option<f32>,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the generated files. Defaults to the site root.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Plain-text file announcing the index location. Empty disables it.
    #[serde(default = "default_discovery_file")]
    pub discovery_file: Option<String>,
}

// Default value functions
fn default_custom_domain_file() -> String {
    "CNAME".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_hosting_domain() -> String {
    "github.io".to_string()
}

fn default_page_extension() -> String {
    "html".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    [".git", ".github", "assets", "css", "js"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excluded_files() -> Vec<String> {
    ["index.html", "404.html", "robots.txt", "map-root.xml"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_max_urls_per_file() -> usize {
    5000
}

fn default_file_prefix() -> String {
    "m_".to_string()
}

fn default_discovery_file() -> Option<String> {
    Some("sitemap.txt".to_string())
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            custom_domain_file: default_custom_domain_file(),
            require_custom_domain: false,
            remote: default_remote(),
            hosting_domain: default_hosting_domain(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_extension: default_page_extension(),
            excluded_dirs: default_excluded_dirs(),
            excluded_files: default_excluded_files(),
            use_git_dates: true,
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            max_urls_per_file: default_max_urls_per_file(),
            naming: Naming::default(),
            file_prefix: default_file_prefix(),
            index_file: None,
            changefreq: None,
            priority: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            discovery_file: default_discovery_file(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file layered with
    /// `PAGEMAP__SECTION__KEY` environment variables.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading configuration file");
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("PAGEMAP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("discovery.excluded_dirs")
                    .with_list_parse_key("discovery.excluded_files"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()
            .map_err(|e| CoreError::config_with_source("Failed to parse configuration", e))?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let max = self.sitemap.max_urls_per_file;
        if max == 0 {
            return Err(CoreError::config(
                "sitemap.max_urls_per_file must be at least 1",
            ));
        }
        if max > PROTOCOL_MAX_URLS {
            return Err(CoreError::config(format!(
                "sitemap.max_urls_per_file must not exceed {PROTOCOL_MAX_URLS}, got {max}"
            )));
        }

        if let Some(priority) = self.sitemap.priority
            && !(0.0..=1.0).contains(&priority)
        {
            return Err(CoreError::config(format!(
                "sitemap.priority must be between 0.0 and 1.0, got {priority}"
            )));
        }

        let extension = self.discovery.page_extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(CoreError::config("discovery.page_extension cannot be empty"));
        }

        if self.sitemap.file_prefix.contains(['/', '\\']) {
            return Err(CoreError::config(
                "sitemap.file_prefix cannot contain path separators",
            ));
        }

        if let Some(base_url) = &self.site.base_url
            && base_url.ends_with('/')
        {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Suffix a file name must end with to be a page, including the dot.
    pub fn page_suffix(&self) -> String {
        format!(
            ".{}",
            self.discovery.page_extension.trim_start_matches('.')
        )
    }

    /// Discovery file name, `None` when disabled.
    pub fn discovery_file(&self) -> Option<&str> {
        self.output
            .discovery_file
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Directory outputs are written to for a given site root.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        match &self.output.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
custom_domain_file = "DOMAIN"
require_custom_domain = true
remote = "upstream"

[discovery]
page_extension = "htm"
excluded_dirs = ["drafts"]
excluded_files = ["home.htm"]
use_git_dates = false

[sitemap]
max_urls_per_file = 3000
naming = "content-hash"
file_prefix = "sm_"
index_file = "map-root.xml"
changefreq = "weekly"
priority = 0.5

[output]
dir = "public"
discovery_file = ""
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml_str(&create_test_config()).expect("parse config");

        assert_eq!(config.site.custom_domain_file, "DOMAIN");
        assert!(config.site.require_custom_domain);
        assert_eq!(config.site.remote, "upstream");
        assert_eq!(config.site.hosting_domain, "github.io");
        assert_eq!(config.discovery.page_extension, "htm");
        assert_eq!(config.discovery.excluded_dirs, vec!["drafts"]);
        assert_eq!(config.discovery.excluded_files, vec!["home.htm"]);
        assert!(!config.discovery.use_git_dates);
        assert_eq!(config.sitemap.max_urls_per_file, 3000);
        assert_eq!(config.sitemap.naming, Naming::ContentHash);
        assert_eq!(config.sitemap.file_prefix, "sm_");
        assert_eq!(config.sitemap.index_file.as_deref(), Some("map-root.xml"));
        assert_eq!(config.sitemap.changefreq, Some(ChangeFreq::Weekly));
        assert_eq!(config.sitemap.priority, Some(0.5));
        assert_eq!(config.output.dir, Some(PathBuf::from("public")));
        assert_eq!(config.discovery_file(), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert!(config.site.base_url.is_none());
        assert_eq!(config.site.custom_domain_file, "CNAME");
        assert!(!config.site.require_custom_domain);
        assert_eq!(config.site.remote, "origin");
        assert_eq!(config.page_suffix(), ".html");
        assert!(config.discovery.excluded_dirs.contains(&"assets".to_string()));
        assert!(config.discovery.excluded_files.contains(&"404.html".to_string()));
        assert!(config.discovery.use_git_dates);
        assert_eq!(config.sitemap.max_urls_per_file, 5000);
        assert_eq!(config.sitemap.naming, Naming::Random);
        assert_eq!(config.sitemap.file_prefix, "m_");
        assert_eq!(config.discovery_file(), Some("sitemap.txt"));
    }

    #[test]
    fn test_empty_toml_matches_defaults() {
        let config = Config::from_toml_str("").expect("parse empty config");
        let defaults = Config::default();

        assert_eq!(config.sitemap.max_urls_per_file, defaults.sitemap.max_urls_per_file);
        assert_eq!(config.discovery.excluded_dirs, defaults.discovery.excluded_dirs);
        assert_eq!(config.output.discovery_file, defaults.output.discovery_file);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config =
            Config::load_with_env(&dir.path().join("pagemap.toml")).expect("load defaults");
        assert_eq!(config.sitemap.file_prefix, "m_");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("pagemap.toml");
        std::fs::write(
            &config_path,
            "[site]\nbase_url = \"https://docs.example.com\"\n",
        )
        .expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(
            config.site.base_url.as_deref(),
            Some("https://docs.example.com")
        );
    }

    #[test]
    fn test_validation_zero_max_urls() {
        let result = Config::from_toml_str("[sitemap]\nmax_urls_per_file = 0\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least 1"));
    }

    #[test]
    fn test_validation_protocol_limit() {
        let result = Config::from_toml_str("[sitemap]\nmax_urls_per_file = 50001\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("must not exceed"));
    }

    #[test]
    fn test_validation_priority_range() {
        let result = Config::from_toml_str("[sitemap]\npriority = 1.5\n");
        assert!(result.unwrap_err().to_string().contains("priority"));
    }

    #[test]
    fn test_page_suffix_tolerates_leading_dot() {
        let mut config = Config::default();
        config.discovery.page_extension = ".htm".to_string();
        assert_eq!(config.page_suffix(), ".htm");
    }

    #[test]
    fn test_output_dir() {
        let mut config = Config::default();
        let root = Path::new("/srv/site");
        assert_eq!(config.output_dir(root), PathBuf::from("/srv/site"));

        config.output.dir = Some(PathBuf::from("out"));
        assert_eq!(config.output_dir(root), PathBuf::from("/srv/site/out"));
    }
}
