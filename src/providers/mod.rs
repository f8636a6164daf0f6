//! Data sources backing the catalog.

pub mod http;
pub mod local;

use crate::core::config::SourceConfig;
use crate::core::source::DataSource;
use anyhow::Result;
use tracing::debug;

pub use http::HttpSource;
pub use local::FileSource;

/// Picks the source named by the configuration. A local `data_path` takes
/// precedence over `base_url`.
pub fn source_from_config(config: &SourceConfig) -> Result<Box<dyn DataSource>> {
    if let Some(data_path) = &config.data_path {
        debug!("Using local data at {}", data_path);
        return Ok(Box::new(FileSource::new(data_path)));
    }
    if let Some(base_url) = &config.base_url {
        debug!("Using remote data at {}", base_url);
        return Ok(Box::new(HttpSource::new(base_url)?));
    }
    anyhow::bail!("No data source configured: set source.data_path or source.base_url")
}
