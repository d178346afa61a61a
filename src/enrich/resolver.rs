//! Per-ticker enrichment with fault isolation.
//!
//! Every lookup failure is absorbed here: a classification error, a feed
//! error, or a timeout turns into absent fields plus a warning, never into
//! an error the pipeline has to handle. Classification and news are
//! resolved independently, so one failing leaves the other intact.

use super::lookups::{ClassificationLookup, FeedEntry, NewsFeedLookup};
use crate::snapshot::{Enrichment, NewsItem};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// A non-fatal problem encountered while enriching one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentWarning {
    ClassificationFailed { symbol: String, reason: String },
    NewsFailed { symbol: String, reason: String },
}

impl fmt::Display for EnrichmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentWarning::ClassificationFailed { symbol, reason } => {
                write!(f, "{}: classification unavailable ({})", symbol, reason)
            }
            EnrichmentWarning::NewsFailed { symbol, reason } => {
                write!(f, "{}: news unavailable ({})", symbol, reason)
            }
        }
    }
}

/// Resolves classification and news for tickers via the external lookup
/// collaborators.
///
/// # Key Features
/// * Classification and news resolved concurrently and independently
/// * Per-lookup timeout so one slow symbol cannot stall the run
/// * Bounded worker count across symbols to respect the sources'
///   informal rate limits
/// * Failures degrade to absent fields; nothing here returns an error
#[derive(Clone)]
pub struct EnrichmentResolver {
    classification: Arc<dyn ClassificationLookup>,
    news: Arc<dyn NewsFeedLookup>,
    lookup_timeout: Duration,
    max_concurrent: usize,
}

impl EnrichmentResolver {
    /// Creates a resolver over the given lookup collaborators.
    ///
    /// # Arguments
    /// * `classification`: Sector/industry source
    /// * `news`: Headline feed source
    /// * `lookup_timeout`: Time budget per individual lookup call
    /// * `max_concurrent`: Upper bound on in-flight symbols
    pub fn new(
        classification: Arc<dyn ClassificationLookup>,
        news: Arc<dyn NewsFeedLookup>,
        lookup_timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            classification,
            news,
            lookup_timeout,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Resolves one symbol's enrichment.
    ///
    /// Both sub-resolutions run concurrently; each is separately bounded
    /// by the lookup timeout and separately absorbed on failure. The
    /// returned enrichment always exists — at worst it is all-absent.
    pub async fn resolve(&self, symbol: &str) -> (Enrichment, Vec<EnrichmentWarning>) {
        let (classification, news) = tokio::join!(
            timeout(self.lookup_timeout, self.classification.lookup(symbol)),
            timeout(self.lookup_timeout, self.news.lookup_feed(symbol)),
        );

        let mut enrichment = Enrichment::default();
        let mut warnings = Vec::new();

        match flatten_timeout(classification) {
            Ok(class) => {
                enrichment.sector = class.sector;
                enrichment.industry = class.industry;
            }
            Err(reason) => {
                tracing::warn!(symbol, %reason, "classification lookup failed");
                warnings.push(EnrichmentWarning::ClassificationFailed {
                    symbol: symbol.to_string(),
                    reason,
                });
            }
        }

        match flatten_timeout(news) {
            Ok(entries) => enrichment.news = entries.first().map(news_item),
            Err(reason) => {
                tracing::warn!(symbol, %reason, "news lookup failed");
                warnings.push(EnrichmentWarning::NewsFailed {
                    symbol: symbol.to_string(),
                    reason,
                });
            }
        }

        (enrichment, warnings)
    }

    /// Resolves a batch of symbols with bounded concurrency.
    ///
    /// Each distinct symbol is resolved at most once; duplicates share the
    /// first resolution. Results come back keyed by symbol — the snapshot
    /// join is by key, so completion order does not matter. A panicking or
    /// failing worker costs only its own symbol.
    pub async fn resolve_all(
        &self,
        symbols: &[String],
    ) -> (HashMap<String, Enrichment>, Vec<EnrichmentWarning>) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();

        for symbol in symbols {
            if !seen.insert(symbol.clone()) {
                continue;
            }
            let symbol = symbol.clone();
            let resolver = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                let (enrichment, warnings) = resolver.resolve(&symbol).await;
                (symbol, enrichment, warnings)
            });
        }

        let mut enrichments = HashMap::new();
        let mut all_warnings = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, enrichment, warnings)) => {
                    enrichments.insert(symbol, enrichment);
                    all_warnings.extend(warnings);
                }
                Err(err) => {
                    // A panicked worker loses one symbol; the batch goes on.
                    tracing::warn!(error = %err, "enrichment worker failed");
                }
            }
        }

        (enrichments, all_warnings)
    }
}

/// Collapses a timed-out or failed lookup into a single reason string.
fn flatten_timeout<T>(
    result: Result<anyhow::Result<T>, tokio::time::error::Elapsed>,
) -> Result<T, String> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err("timed out".to_string()),
    }
}

/// Converts a raw feed entry into a typed news item.
///
/// The publish date is expected in RFC 2822 (the feed's documented
/// format); anything else becomes an absent timestamp, not an error.
fn news_item(entry: &FeedEntry) -> NewsItem {
    let published_at: Option<DateTime<Utc>> = DateTime::parse_from_rfc2822(entry.published.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc));

    NewsItem {
        published_at,
        title: entry.title.clone(),
        summary: entry.summary.clone(),
        link: entry.link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::lookups::Classification;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct FixedClassification {
        fail_for: Vec<String>,
    }

    #[async_trait]
    impl ClassificationLookup for FixedClassification {
        async fn lookup(&self, symbol: &str) -> anyhow::Result<Classification> {
            if self.fail_for.iter().any(|s| s == symbol) {
                return Err(anyhow!("symbol not found"));
            }
            Ok(Classification {
                sector: Some("Technology".to_string()),
                industry: Some("Semiconductors".to_string()),
            })
        }
    }

    struct FixedNews {
        fail_for: Vec<String>,
        published: String,
    }

    #[async_trait]
    impl NewsFeedLookup for FixedNews {
        async fn lookup_feed(&self, symbol: &str) -> anyhow::Result<Vec<FeedEntry>> {
            if self.fail_for.iter().any(|s| s == symbol) {
                return Err(anyhow!("feed unreachable"));
            }
            Ok(vec![FeedEntry {
                published: self.published.clone(),
                title: format!("{} rallies", symbol),
                summary: "Shares moved.".to_string(),
                link: format!("https://example.com/{}", symbol),
            }])
        }
    }

    fn resolver(class_fail: &[&str], news_fail: &[&str]) -> EnrichmentResolver {
        EnrichmentResolver::new(
            Arc::new(FixedClassification {
                fail_for: class_fail.iter().map(|s| s.to_string()).collect(),
            }),
            Arc::new(FixedNews {
                fail_for: news_fail.iter().map(|s| s.to_string()).collect(),
                published: "Mon, 05 Aug 2024 14:30:00 +0000".to_string(),
            }),
            Duration::from_secs(5),
            4,
        )
    }

    #[tokio::test]
    async fn test_full_resolution() {
        let (enrichment, warnings) = resolver(&[], &[]).resolve("NVDA").await;

        assert!(warnings.is_empty());
        assert_eq!(enrichment.sector.as_deref(), Some("Technology"));
        assert_eq!(enrichment.industry.as_deref(), Some("Semiconductors"));
        let news = enrichment.news.unwrap();
        assert_eq!(news.title, "NVDA rallies");
        assert!(news.published_at.is_some());
    }

    #[tokio::test]
    async fn test_classification_failure_leaves_news_intact() {
        let (enrichment, warnings) = resolver(&["TSLA"], &[]).resolve("TSLA").await;

        assert!(enrichment.sector.is_none());
        assert!(enrichment.industry.is_none());
        assert!(enrichment.news.is_some());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            EnrichmentWarning::ClassificationFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_news_failure_leaves_classification_intact() {
        let (enrichment, warnings) = resolver(&[], &["TSLA"]).resolve("TSLA").await;

        assert_eq!(enrichment.sector.as_deref(), Some("Technology"));
        assert!(enrichment.news.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], EnrichmentWarning::NewsFailed { .. }));
    }

    #[tokio::test]
    async fn test_failure_for_one_symbol_does_not_affect_another() {
        let resolver = resolver(&["TSLA"], &[]);
        let symbols = vec!["TSLA".to_string(), "MSFT".to_string()];

        let (enrichments, warnings) = resolver.resolve_all(&symbols).await;

        assert_eq!(enrichments.len(), 2);
        assert!(enrichments["TSLA"].sector.is_none());
        assert!(enrichments["TSLA"].news.is_some());
        assert_eq!(enrichments["MSFT"].sector.as_deref(), Some("Technology"));
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_symbols_resolved_once() {
        let resolver = resolver(&[], &[]);
        let symbols = vec!["AAPL".to_string(), "AAPL".to_string()];

        let (enrichments, _) = resolver.resolve_all(&symbols).await;

        assert_eq!(enrichments.len(), 1);
        assert!(enrichments.contains_key("AAPL"));
    }

    #[tokio::test]
    async fn test_unexpected_date_format_becomes_absent_timestamp() {
        let resolver = EnrichmentResolver::new(
            Arc::new(FixedClassification { fail_for: vec![] }),
            Arc::new(FixedNews {
                fail_for: vec![],
                published: "2024-08-05 14:30".to_string(),
            }),
            Duration::from_secs(5),
            2,
        );

        let (enrichment, warnings) = resolver.resolve("AMD").await;

        assert!(warnings.is_empty());
        let news = enrichment.news.unwrap();
        assert!(news.published_at.is_none());
        assert_eq!(news.title, "AMD rallies");
    }

    struct SlowNews;

    #[async_trait]
    impl NewsFeedLookup for SlowNews {
        async fn lookup_feed(&self, _symbol: &str) -> anyhow::Result<Vec<FeedEntry>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_to_absent() {
        let resolver = EnrichmentResolver::new(
            Arc::new(FixedClassification { fail_for: vec![] }),
            Arc::new(SlowNews),
            Duration::from_millis(50),
            2,
        );

        let (enrichment, warnings) = resolver.resolve("INTC").await;

        assert_eq!(enrichment.sector.as_deref(), Some("Technology"));
        assert!(enrichment.news.is_none());
        assert_eq!(
            warnings,
            vec![EnrichmentWarning::NewsFailed {
                symbol: "INTC".to_string(),
                reason: "timed out".to_string(),
            }]
        );
    }
}
