use crate::core::source::DataSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Reads data files from a local checkout of the data directory tree.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FileSource {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DataSource for FileSource {
    #[instrument(name = "FileFetch", skip(self), fields(path = %path))]
    async fn fetch(&self, path: &str) -> Result<String> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        debug!("Reading {}", full_path.display());
        tokio::fs::read_to_string(&full_path)
            .await
            .with_context(|| format!("Failed to read data file: {}", full_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_from_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("data/country_info"))?;
        fs::write(temp_dir.path().join("data/country_info/cr.json"), "[]")?;

        let source = FileSource::new(temp_dir.path());
        assert_eq!(source.fetch("data/country_info/cr.json").await?, "[]");
        assert_eq!(source.fetch("/data/country_info/cr.json").await?, "[]");

        let err = source.fetch("data/missing.json").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read data file"));
        Ok(())
    }
}
