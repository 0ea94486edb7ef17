//! Commands behind the `pagemap` binary.
//!
//! `build` writes sitemap shards, a sitemap index and `sitemap.txt` for a
//! static site; `check` resolves the site URL and counts pages without
//! touching the output directory. Both take their settings from
//! `pagemap.toml` in the site root, `PAGEMAP__*` variables and the options
//! passed here.
//!
//! ```no_run
//! use pagemap::cmd::build::{self, BuildOptions};
//!
//! # fn main() -> color_eyre::eyre::Result<()> {
//! let options = BuildOptions {
//!     output: Some("maps".into()),
//!     base_url: Some("https://docs.example.com".to_string()),
//!     ..BuildOptions::new("public")
//! };
//! build::run(None, &options)?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;

pub use pagemap_core::{Config, SiteIdentity};
pub use pagemap_generator::{BuildStats, Builder};

/// Send log output to stderr, keeping stdout for the build report.
///
/// `-v` raises the level from WARN to INFO, `-vv` to DEBUG and `-vvv` to
/// TRACE. `RUST_LOG` directives are honoured on top.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
