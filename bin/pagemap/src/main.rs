//! pagemap CLI
//!
//! Generates sharded XML sitemaps and a sitemap index for a static website.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use pagemap::cmd::{self, build::BuildOptions};

/// Command-line interface for pagemap.
#[derive(Parser)]
#[command(
    name = "pagemap",
    version,
    about = "Generate sharded XML sitemaps for a static website"
)]
struct Cli {
    /// Path to configuration file (default: pagemap.toml in the site root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Scan the site and write sitemaps plus the sitemap index
    Build {
        /// Site root to scan
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Output directory, relative to the site root (default: the site root)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override site base URL (e.g., https://example.com)
        #[arg(long)]
        base_url: Option<String>,
        /// Maximum URLs per sitemap file
        #[arg(long)]
        max_urls: Option<usize>,
        /// Date every page with today's date instead of querying git
        #[arg(long)]
        no_git_dates: bool,
    },
    /// Resolve the site URL and count pages without writing anything
    Check {
        /// Site root to scan
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
        /// Print every page URL
        #[arg(long)]
        list: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    pagemap::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            root,
            output,
            base_url,
            max_urls,
            no_git_dates,
        } => {
            let options = BuildOptions {
                root,
                output,
                base_url,
                max_urls,
                no_git_dates,
            };
            cmd::build::run(cli.config.as_deref(), &options)?;
        }
        Commands::Check { root, list } => {
            cmd::check::run(cli.config.as_deref(), &root, list)?;
        }
    }

    Ok(())
}
