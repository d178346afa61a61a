//! External lookup collaborators for per-ticker enrichment.
//!
//! Two independent sources: a classification endpoint giving sector and
//! industry, and a headline RSS feed giving recent news. Both are behind
//! traits so the resolver and the pipeline tests can inject failures.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

/// Sector/industry classification for one symbol. Either field may be
/// missing without invalidating the other.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// One entry of a news feed, as raw text. The resolver decides how to
/// interpret the publish date.
#[derive(Debug, Clone, Default)]
pub struct FeedEntry {
    pub published: String,
    pub title: String,
    pub summary: String,
    pub link: String,
}

/// Resolves a symbol to its sector/industry classification.
#[async_trait]
pub trait ClassificationLookup: Send + Sync {
    async fn lookup(&self, symbol: &str) -> Result<Classification>;
}

/// Resolves a symbol to its news feed entries, most recent first.
#[async_trait]
pub trait NewsFeedLookup: Send + Sync {
    async fn lookup_feed(&self, symbol: &str) -> Result<Vec<FeedEntry>>;
}

/// Classification via Yahoo's quoteSummary `assetProfile` module.
pub struct YahooProfileLookup {
    client: reqwest::Client,
}

impl YahooProfileLookup {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClassificationLookup for YahooProfileLookup {
    async fn lookup(&self, symbol: &str) -> Result<Classification> {
        let url = format!(
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=assetProfile",
            symbol
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("classification request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("classification HTTP error: {}", response.status()));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .context("classification response was not JSON")?;

        let profile = body
            .get("quoteSummary")
            .and_then(|qs| qs.get("result"))
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("assetProfile"))
            .ok_or_else(|| anyhow!("no assetProfile in response for {}", symbol))?;

        Ok(Classification {
            sector: profile
                .get("sector")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            industry: profile
                .get("industry")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        })
    }
}

/// News via Yahoo's per-symbol headline RSS feed.
pub struct YahooNewsFeed {
    client: reqwest::Client,
}

impl YahooNewsFeed {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NewsFeedLookup for YahooNewsFeed {
    async fn lookup_feed(&self, symbol: &str) -> Result<Vec<FeedEntry>> {
        let url = format!(
            "https://feeds.finance.yahoo.com/rss/2.0/headline?s={}&region=US&lang=en-US",
            symbol
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("news feed request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("news feed HTTP error: {}", response.status()));
        }

        let content = response
            .bytes()
            .await
            .context("failed to read news feed body")?;

        let channel =
            rss::Channel::read_from(&content[..]).context("failed to parse news feed")?;

        let entries = channel
            .items()
            .iter()
            .map(|item| FeedEntry {
                published: item.pub_date().unwrap_or_default().to_string(),
                title: item.title().unwrap_or_default().to_string(),
                summary: item.description().unwrap_or_default().to_string(),
                link: item.link().unwrap_or_default().to_string(),
            })
            .collect();

        Ok(entries)
    }
}
