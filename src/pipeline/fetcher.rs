use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

/// Retrieves the raw text of a source page.
///
/// The only collaborator whose failure is fatal for a run: if the trending
/// page cannot be fetched there is nothing to snapshot.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Production fetcher over a shared reqwest client.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error fetching {}: {}", url, response.status()));
        }

        response.text().await.context("failed to read page body")
    }
}
