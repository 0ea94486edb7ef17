//! CLI command implementations.

pub mod build;
pub mod check;

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use pagemap_core::Config;

/// Default configuration file name, looked up in the site root.
pub const DEFAULT_CONFIG_FILE: &str = "pagemap.toml";

/// Load configuration from `config_path`, or from `pagemap.toml` in the site
/// root when no path is given. A missing default file means defaults.
pub fn load_config(config_path: Option<&Path>, root: &Path) -> Result<Config> {
    let path: PathBuf = match config_path {
        Some(path) => {
            if !path.exists() {
                color_eyre::eyre::bail!("Configuration file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => root.join(DEFAULT_CONFIG_FILE),
    };

    Config::load_with_env(&path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.sitemap.max_urls_per_file, 5000);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("custom.toml")), dir.path());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_default_config_in_root_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[sitemap]\nmax_urls_per_file = 3000\n",
        )
        .unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.sitemap.max_urls_per_file, 3000);
    }
}
