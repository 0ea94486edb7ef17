//! Sitemap location file.
//!
//! Writes a small plain-text file carrying a robots.txt style `Sitemap:`
//! directive so crawlers and site tooling can find the generated index.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

/// Location file errors.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for location file generation.
pub type Result<T> = std::result::Result<T, AnnounceError>;

/// Writer for the sitemap location file.
#[derive(Debug)]
pub struct Announcer {
    file_name: String,
}

impl Announcer {
    /// Create a writer producing `file_name`.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Contents of the location file for the given index URL.
    #[must_use]
    pub fn generate(&self, index_url: &str) -> String {
        format!("Sitemap: {index_url}\n")
    }

    /// Write the location file into `output_dir`.
    pub fn write(&self, output_dir: &Path, index_url: &str) -> Result<PathBuf> {
        let path = output_dir.join(&self.file_name);
        info!(path = %path.display(), "writing sitemap location file");

        let mut file = File::create(&path)?;
        file.write_all(self.generate(index_url).as_bytes())?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let announcer = Announcer::new("sitemap.txt");
        assert_eq!(
            announcer.generate("https://example.com/map-root.xml"),
            "Sitemap: https://example.com/map-root.xml\n"
        );
    }

    #[test]
    fn test_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = Announcer::new("sitemap.txt")
            .write(dir.path(), "https://example.com/m_abc.xml")
            .unwrap();

        assert_eq!(path, dir.path().join("sitemap.txt"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("Sitemap: https://example.com/m_abc.xml"));
    }
}
