use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single extracted row from the trending-tickers table.
///
/// Numeric fields are `None` when the source text could not be normalized.
/// Absence is meaningful: a price of `0.0` is a real (if unlikely) quote,
/// while `None` means "the source did not tell us".
///
/// # Fields
/// * `symbol`: Uppercase trading symbol; always present and non-empty
/// * `company_name`: Company name as printed by the source, empty if missing
/// * `last_price`: Most recent trade price
/// * `percent_change`: Signed percent change on the day
/// * `volume`: Share volume, scaled out of `K`/`M`/`B` notation
/// * `market_cap`: Market capitalization, scaled out of suffix notation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TickerRow {
    pub symbol: String,
    pub company_name: String,
    pub last_price: Option<f64>,
    pub percent_change: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

/// The most recent news headline for a ticker.
///
/// Feed entries are frequently incomplete; missing text fields default to
/// empty strings and an unparseable publish date becomes `None` rather than
/// failing the enrichment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewsItem {
    pub published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub summary: String,
    pub link: String,
}

/// Supplementary per-ticker data resolved from sources independent of the
/// main table.
///
/// Each sub-field is resolved in isolation: a failed classification lookup
/// leaves `sector`/`industry` absent without touching `news`, and vice
/// versa. The `Default` value (everything absent) is what a ticker gets
/// when every lookup failed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Enrichment {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub news: Option<NewsItem>,
}

/// One entry of a snapshot: an extracted row joined with its enrichment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub row: TickerRow,
    pub enrichment: Enrichment,
}

/// An immutable batch of ticker records captured at a point in time.
///
/// Entry order matches the source table's row order. Once assembled a
/// snapshot is read-only history; nothing in the crate mutates it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub captured_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

/// Joins extracted rows with their enrichments into a snapshot.
///
/// The join is by exact, case-sensitive symbol. A row whose symbol has no
/// entry in `enrichments` joins to an all-absent `Enrichment` — every row
/// that survived extraction appears in the snapshot exactly once, in the
/// order it arrived.
///
/// # Arguments
/// * `captured_at`: Capture timestamp stamped onto the snapshot
/// * `rows`: Extracted rows, in source order
/// * `enrichments`: Resolved enrichments keyed by symbol
///
/// # Returns
/// The assembled `MarketSnapshot`; deterministic given its inputs.
pub fn assemble(
    captured_at: DateTime<Utc>,
    rows: Vec<TickerRow>,
    enrichments: &HashMap<String, Enrichment>,
) -> MarketSnapshot {
    let entries = rows
        .into_iter()
        .map(|row| {
            let enrichment = enrichments.get(&row.symbol).cloned().unwrap_or_default();
            SnapshotEntry { row, enrichment }
        })
        .collect();

    MarketSnapshot {
        captured_at,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str) -> TickerRow {
        TickerRow {
            symbol: symbol.to_string(),
            company_name: format!("{} Inc.", symbol),
            last_price: Some(100.0),
            percent_change: Some(1.5),
            volume: None,
            market_cap: None,
        }
    }

    #[test]
    fn test_every_row_appears_exactly_once() {
        let rows = vec![row("AAPL"), row("MSFT"), row("TSLA")];
        let mut enrichments = HashMap::new();
        enrichments.insert(
            "MSFT".to_string(),
            Enrichment {
                sector: Some("Technology".to_string()),
                industry: Some("Software".to_string()),
                news: None,
            },
        );

        let snapshot = assemble(Utc::now(), rows.clone(), &enrichments);

        assert_eq!(snapshot.entries.len(), rows.len());
        let symbols: Vec<&str> = snapshot
            .entries
            .iter()
            .map(|e| e.row.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[test]
    fn test_missing_enrichment_joins_to_all_absent() {
        let rows = vec![row("AAPL")];
        let enrichments = HashMap::new();

        let snapshot = assemble(Utc::now(), rows, &enrichments);

        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].enrichment, Enrichment::default());
    }

    #[test]
    fn test_join_is_case_sensitive() {
        let rows = vec![row("AAPL")];
        let mut enrichments = HashMap::new();
        enrichments.insert(
            "aapl".to_string(),
            Enrichment {
                sector: Some("Technology".to_string()),
                ..Default::default()
            },
        );

        let snapshot = assemble(Utc::now(), rows, &enrichments);

        assert!(snapshot.entries[0].enrichment.sector.is_none());
    }

    #[test]
    fn test_empty_rows_yield_empty_snapshot() {
        let snapshot = assemble(Utc::now(), Vec::new(), &HashMap::new());
        assert!(snapshot.entries.is_empty());
    }
}
