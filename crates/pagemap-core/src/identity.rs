//! Site identity resolution.
//!
//! Determines the canonical base URL every page and sitemap URL is rooted at.
//! Sources are tried in order: explicit configuration, the custom-domain
//! marker file, then the git remote (`https://<owner>.<hosting-domain>/<repo>`).

use std::{fmt, fs, io, path::Path};

use tracing::{debug, info};

use crate::{
    config::SiteConfig,
    error::{CoreError, Result},
    git::VersionControl,
};

/// Where a [`SiteIdentity`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// `site.base_url` from configuration or the command line.
    Explicit,
    /// The custom-domain marker file.
    CustomDomain,
    /// Derived from the git remote URL.
    GitRemote,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Explicit => "configuration",
            Self::CustomDomain => "custom domain",
            Self::GitRemote => "git remote",
        };
        f.write_str(label)
    }
}

/// The resolved base URL of the site, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    base_url: String,
    source: IdentitySource,
}

impl SiteIdentity {
    /// Create an identity from a known base URL.
    pub fn new(base_url: impl Into<String>, source: IdentitySource) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            source,
        }
    }

    /// Resolve the identity of the site rooted at `root`.
    ///
    /// Fails when no source yields a URL, or when `require_custom_domain` is
    /// set and the marker file is missing or empty.
    pub fn resolve(root: &Path, site: &SiteConfig, vcs: &impl VersionControl) -> Result<Self> {
        if let Some(base_url) = site.base_url.as_deref().map(str::trim)
            && !base_url.is_empty()
        {
            debug!(base_url, "using configured base URL");
            return Ok(Self::new(base_url, IdentitySource::Explicit));
        }

        let marker = root.join(&site.custom_domain_file);
        if let Some(domain) = read_custom_domain(&marker)? {
            info!(domain = %domain, "using custom domain");
            return Ok(Self::new(
                format!("https://{domain}"),
                IdentitySource::CustomDomain,
            ));
        }

        if site.require_custom_domain {
            return Err(CoreError::identity(format!(
                "custom domain file {} is missing or empty and site.require_custom_domain is set",
                marker.display()
            )));
        }

        let Some(remote_url) = vcs.remote_url(&site.remote) else {
            return Err(CoreError::identity(format!(
                "no custom domain file at {} and no URL for git remote '{}'",
                marker.display(),
                site.remote
            )));
        };

        let (owner, repo) = parse_remote(&remote_url)?;
        let base_url = format!("https://{owner}.{}/{repo}", site.hosting_domain);
        info!(remote = %remote_url, %base_url, "derived base URL from git remote");
        Ok(Self::new(base_url, IdentitySource::GitRemote))
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Which source produced the base URL.
    pub fn source(&self) -> IdentitySource {
        self.source
    }

    /// Absolute URL for a site-relative path that is already URL-safe.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }
}

impl fmt::Display for SiteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Read the custom-domain marker. A missing file or blank content is `None`.
pub fn read_custom_domain(path: &Path) -> Result<Option<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::read(path, e)),
    };

    let domain = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_end_matches('/').to_owned())
        .filter(|line| !line.is_empty());

    Ok(domain)
}

/// Split a git remote URL into `(owner, repo)`.
///
/// Accepts scp-like SSH (`git@host:owner/repo.git`), `ssh://` and
/// `http(s)://` forms, with or without the `.git` suffix.
pub fn parse_remote(url: &str) -> Result<(String, String)> {
    let trimmed = url.trim();

    let path = if let Some((_, rest)) = trimmed.split_once("://") {
        // scheme://[user@]host[:port]/owner/repo
        rest.split_once('/').map(|(_, path)| path)
    } else if let Some((host, path)) = trimmed.split_once(':') {
        // user@host:owner/repo
        (!host.contains('/')).then_some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Err(CoreError::Remote(trimmed.to_owned()));
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    match path.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok(((*owner).to_owned(), (*repo).to_owned()))
        }
        _ => Err(CoreError::Remote(trimmed.to_owned())),
    }
}
