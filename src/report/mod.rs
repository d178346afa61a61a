//! Plain-text rendering of a completed snapshot.

use crate::snapshot::MarketSnapshot;
use std::fmt::Write;

/// Renders a snapshot as an aligned text table with one headline line per
/// ticker that has news. Absent values print as `n/a` so a reader can tell
/// "unknown" from a real zero.
pub fn render_text(snapshot: &MarketSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Trending tickers — captured {}",
        snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "{:<8} {:<28} {:>10} {:>9} {:>12} {:>12}  {}",
        "Symbol", "Name", "Price", "Change%", "Volume", "Mkt Cap", "Sector"
    );

    for entry in &snapshot.entries {
        let row = &entry.row;
        let _ = writeln!(
            out,
            "{:<8} {:<28} {:>10} {:>9} {:>12} {:>12}  {}",
            row.symbol,
            truncate(&row.company_name, 28),
            fmt_opt(row.last_price, 2),
            fmt_opt(row.percent_change, 2),
            fmt_opt(row.volume, 0),
            fmt_opt(row.market_cap, 0),
            entry.enrichment.sector.as_deref().unwrap_or("n/a"),
        );
        if let Some(news) = &entry.enrichment.news {
            if !news.title.is_empty() {
                let _ = writeln!(out, "         ↳ {}", news.title);
            }
        }
    }

    out
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
