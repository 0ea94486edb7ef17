//! Access to the site's git repository.
//!
//! The pipeline only needs two facts from version control: the URL of a
//! remote and the date a path last changed. Both go through
//! [`VersionControl`] so stages can be exercised without a real repository.

use std::{
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use chrono::NaiveDate;
use tracing::{debug, trace};

/// Read-only view of the site's version-control metadata.
pub trait VersionControl {
    /// URL configured for the named remote, if any.
    fn remote_url(&self, remote: &str) -> Option<String>;

    /// Date of the most recent commit touching `path` (relative to the site
    /// root), if the path is tracked and history is available.
    fn last_modified(&self, path: &str) -> Option<NaiveDate>;
}

/// [`VersionControl`] backed by the `git` command line.
///
/// Every query spawns one `git` process in the site root. Failures of any
/// kind (missing binary, not a repository, untracked path) yield `None`.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Create a git accessor rooted at the site directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Site root the commands run in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git and return trimmed stdout on success.
    fn run(&self, args: &[&str]) -> Option<String> {
        let output = match Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                debug!(?args, error = %e, "failed to spawn git");
                return None;
            }
        };

        stdout_if_success(args, &output)
    }
}

fn stdout_if_success(args: &[&str], output: &Output) -> Option<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(?args, status = %output.status, stderr = %stderr.trim(), "git command failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    trace!(?args, %stdout, "git command succeeded");
    (!stdout.is_empty()).then_some(stdout)
}

impl VersionControl for GitCli {
    fn remote_url(&self, remote: &str) -> Option<String> {
        let key = format!("remote.{remote}.url");
        self.run(&["config", "--get", &key])
    }

    fn last_modified(&self, path: &str) -> Option<NaiveDate> {
        // Page names may contain glob characters (`a[1].html`); match them literally.
        let stdout = self.run(&[
            "--literal-pathspecs",
            "log",
            "-1",
            "--format=%cd",
            "--date=short",
            "--",
            path,
        ])?;
        parse_short_date(&stdout)
    }
}

/// Parse git's `--date=short` output (`YYYY-MM-DD`).
pub fn parse_short_date(value: &str) -> Option<NaiveDate> {
    let first_line = value.lines().next()?.trim();
    NaiveDate::parse_from_str(first_line, "%Y-%m-%d").ok()
}
