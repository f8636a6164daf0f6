//! Data source abstractions

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the document at `path`, relative to the data root
    /// (e.g. `data/prices/index.json`).
    async fn fetch(&self, path: &str) -> Result<String>;
}
