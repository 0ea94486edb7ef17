//! Check command - resolve the site URL and list pages without writing

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use pagemap_core::GitCli;
use pagemap_generator::{Builder, encode_path};

use super::load_config;

/// Run the check command.
///
/// Resolves the site identity and discovers pages, printing what a build
/// would index. With `list`, every page URL is printed.
pub fn run(config_path: Option<&Path>, root: &Path, list: bool) -> Result<()> {
    tracing::info!(?config_path, ?root, "Checking site");

    let config = load_config(config_path, root)?;
    let max = config.sitemap.max_urls_per_file;

    let git = GitCli::new(root);
    let summary = Builder::new(config, root)
        .inspect(&git)
        .wrap_err("Check failed")?;

    println!("Checking site...");
    println!(
        "  ✓ Base URL: {} (from {})",
        summary.identity,
        summary.identity.source()
    );

    if summary.pages.is_empty() {
        println!("  ⚠ No pages found");
        return Ok(());
    }

    println!(
        "  ✓ {} pages in {} sitemap file(s)",
        summary.pages.len(),
        summary.pages.len().div_ceil(max)
    );

    if list {
        for page in &summary.pages {
            println!("    {}", summary.identity.url_for(&encode_path(page)));
        }
    }

    Ok(())
}
