use crate::core::source::DataSource;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Reads data files from a static site, e.g. `https://host/data/prices/index.json`.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("globalprice/1.0")
            .build()?;
        Ok(HttpSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DataSource for HttpSource {
    #[instrument(name = "HttpFetch", skip(self), fields(path = %path))]
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for {}", response.status(), path));
        }

        let text = response.text().await?;
        debug!(bytes = text.len(), "Received response");
        Ok(text)
    }
}
