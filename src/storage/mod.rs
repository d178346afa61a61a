//! Snapshot persistence.
//!
//! Snapshots are history: the sink is append-only, one call per completed
//! run, and nothing ever updates or deletes what was written. Rows are
//! flattened to text/number columns keyed by `(captured_at, symbol)`.

use crate::snapshot::MarketSnapshot;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS trending_tickers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    captured_at TEXT NOT NULL,
    symbol TEXT NOT NULL,
    company_name TEXT NOT NULL,
    last_price REAL,
    percent_change REAL,
    volume REAL,
    market_cap REAL,
    sector TEXT,
    industry TEXT,
    news_published TEXT,
    news_title TEXT,
    news_summary TEXT,
    news_link TEXT
);

CREATE INDEX IF NOT EXISTS idx_trending_captured_symbol
ON trending_tickers(captured_at, symbol);
"#;

/// Durable store for completed snapshots.
pub trait SnapshotSink: Send {
    fn append(&mut self, snapshot: &MarketSnapshot) -> Result<()>;
}

/// SQLite-backed sink, one flat row per snapshot entry.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .context("failed to create trending_tickers table")?;
        Ok(Self { conn })
    }
}

impl SnapshotSink for SqliteSink {
    fn append(&mut self, snapshot: &MarketSnapshot) -> Result<()> {
        let tx = self.conn.transaction().context("failed to begin append")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO trending_tickers
                 (captured_at, symbol, company_name, last_price, percent_change,
                  volume, market_cap, sector, industry,
                  news_published, news_title, news_summary, news_link)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;

            let captured_at = snapshot.captured_at.to_rfc3339();
            for entry in &snapshot.entries {
                let news = entry.enrichment.news.as_ref();
                stmt.execute(params![
                    captured_at,
                    entry.row.symbol,
                    entry.row.company_name,
                    entry.row.last_price,
                    entry.row.percent_change,
                    entry.row.volume,
                    entry.row.market_cap,
                    entry.enrichment.sector,
                    entry.enrichment.industry,
                    news.and_then(|n| n.published_at.map(|dt| dt.to_rfc3339())),
                    news.map(|n| n.title.clone()),
                    news.map(|n| n.summary.clone()),
                    news.map(|n| n.link.clone()),
                ])?;
            }
        }
        tx.commit().context("failed to commit snapshot")?;

        tracing::info!(
            entries = snapshot.entries.len(),
            captured_at = %snapshot.captured_at,
            "snapshot persisted"
        );
        Ok(())
    }
}
