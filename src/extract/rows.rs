use super::normalize::{normalize_magnitude, normalize_percent, normalize_price};
use super::table::RawTable;
use crate::snapshot::TickerRow;
use std::fmt;

/// Maps each logical field to the raw column-name spellings the source has
/// used across its revisions.
///
/// The source renames columns between runs (`"% Change"` vs `"Change %"`,
/// `"Last Price"` vs `"Price (Intraday)"`), so extraction matches headers
/// against these alias sets instead of hard-coding positions or a single
/// spelling. Matching is case-insensitive and whitespace-trimmed.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    pub symbol: Vec<String>,
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub change: Vec<String>,
    pub volume: Vec<String>,
    pub market_cap: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        fn names(raw: &[&str]) -> Vec<String> {
            raw.iter().map(|s| s.to_string()).collect()
        }

        Self {
            symbol: names(&["Symbol", "Ticker"]),
            name: names(&["Name", "Company", "Company Name"]),
            price: names(&["Last Price", "Price (Intraday)", "Price"]),
            change: names(&["% Change", "Change %", "Pct Change", "% Chg"]),
            volume: names(&["Volume", "Vol"]),
            market_cap: names(&["Market Cap", "Mkt Cap"]),
        }
    }
}

impl ColumnAliases {
    /// Finds the cell for a logical field in one labeled row, if any of the
    /// field's alias spellings matches a column name.
    fn find<'a>(aliases: &[String], labeled: &[(&str, &'a str)]) -> Option<&'a str> {
        labeled.iter().find_map(|(header, cell)| {
            let header = header.trim();
            aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(header))
                .then_some(*cell)
        })
    }
}

/// A non-fatal problem encountered while extracting one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowWarning {
    /// The row had no symbol cell (or an empty one) and was dropped.
    MissingSymbol { row: usize },
    /// A numeric cell was present but could not be normalized; the field
    /// was recorded as absent.
    UnparseableField {
        symbol: String,
        field: &'static str,
        raw: String,
    },
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::MissingSymbol { row } => {
                write!(f, "row {} dropped: no symbol", row)
            }
            RowWarning::UnparseableField { symbol, field, raw } => {
                write!(f, "{}: could not normalize {} {:?}", symbol, field, raw)
            }
        }
    }
}

/// Extracts structurally valid ticker rows from a raw table.
///
/// Never fails: a row without a symbol is dropped with a warning, any
/// other missing column becomes an absent field, and a numeric cell that
/// fails normalization becomes absent with a warning. A table missing the
/// symbol column entirely yields an empty row set.
///
/// # Arguments
/// * `table`: Labeled cells pulled from the source page
/// * `aliases`: Accepted raw spellings per logical field
///
/// # Returns
/// Extracted rows in source order, plus the warnings accumulated along
/// the way.
pub fn extract(table: &RawTable, aliases: &ColumnAliases) -> (Vec<TickerRow>, Vec<RowWarning>) {
    let mut rows = Vec::with_capacity(table.row_count());
    let mut warnings = Vec::new();

    for index in 0..table.row_count() {
        let labeled: Vec<(&str, &str)> = table.labeled_row(index).collect();

        let symbol = ColumnAliases::find(&aliases.symbol, &labeled)
            .map(str::trim)
            .unwrap_or("");
        if symbol.is_empty() {
            warnings.push(RowWarning::MissingSymbol { row: index });
            continue;
        }
        let symbol = symbol.to_ascii_uppercase();

        let company_name = ColumnAliases::find(&aliases.name, &labeled)
            .map(str::trim)
            .unwrap_or("")
            .to_string();

        let last_price = numeric_field(
            &symbol,
            "last_price",
            ColumnAliases::find(&aliases.price, &labeled),
            normalize_price,
            &mut warnings,
        );
        let percent_change = numeric_field(
            &symbol,
            "percent_change",
            ColumnAliases::find(&aliases.change, &labeled),
            normalize_percent,
            &mut warnings,
        );
        let volume = numeric_field(
            &symbol,
            "volume",
            ColumnAliases::find(&aliases.volume, &labeled),
            normalize_magnitude,
            &mut warnings,
        );
        let market_cap = numeric_field(
            &symbol,
            "market_cap",
            ColumnAliases::find(&aliases.market_cap, &labeled),
            normalize_magnitude,
            &mut warnings,
        );

        rows.push(TickerRow {
            symbol,
            company_name,
            last_price,
            percent_change,
            volume,
            market_cap,
        });
    }

    (rows, warnings)
}

/// Runs a normalizer over an optional cell.
///
/// A missing column is absent without comment; a present cell that fails
/// normalization is absent with a warning, since the source said something
/// we could not read.
fn numeric_field(
    symbol: &str,
    field: &'static str,
    cell: Option<&str>,
    normalizer: fn(&str) -> Option<f64>,
    warnings: &mut Vec<RowWarning>,
) -> Option<f64> {
    let raw = cell?;
    let value = normalizer(raw);
    if value.is_none() && !raw.trim().is_empty() {
        tracing::warn!(symbol, field, raw, "field failed normalization");
        warnings.push(RowWarning::UnparseableField {
            symbol: symbol.to_string(),
            field,
            raw: raw.to_string(),
        });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_extracts_and_normalizes_a_full_row() {
        let raw = table(
            &["Symbol", "Name", "Last Price", "% Change", "Volume", "Market Cap"],
            &[&["aapl", "Apple Inc.", "187.44", "+1.23%", "45.6M", "2.9T"]],
        );

        let (rows, warnings) = extract(&raw, &ColumnAliases::default());

        assert!(warnings.is_empty());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.symbol, "AAPL");
        assert_eq!(row.company_name, "Apple Inc.");
        assert_eq!(row.last_price, Some(187.44));
        assert_eq!(row.percent_change, Some(1.23));
        assert_eq!(row.volume, Some(45_600_000.0));
        assert_eq!(row.market_cap, Some(2_900_000_000_000.0));
    }

    #[test]
    fn test_renamed_change_column_still_matches() {
        let raw = table(&["Ticker", "Change %"], &[&["MSFT", "-0.50%"]]);

        let (rows, _) = extract(&raw, &ColumnAliases::default());

        assert_eq!(rows[0].symbol, "MSFT");
        assert_eq!(rows[0].percent_change, Some(-0.5));
    }

    #[test]
    fn test_symbolless_row_is_dropped_with_warning() {
        let raw = table(
            &["Symbol", "% Change", "Volume"],
            &[
                &["AAPL", "+1.23%", "45.6M"],
                &["", "2%", "1M"],
            ],
        );

        let (rows, warnings) = extract(&raw, &ColumnAliases::default());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "AAPL");
        assert_eq!(rows[0].percent_change, Some(1.23));
        assert_eq!(rows[0].volume, Some(45_600_000.0));
        assert_eq!(warnings, vec![RowWarning::MissingSymbol { row: 1 }]);
    }

    #[test]
    fn test_missing_symbol_column_yields_empty_set() {
        let raw = table(&["Name", "% Change"], &[&["Apple Inc.", "+1.23%"]]);

        let (rows, warnings) = extract(&raw, &ColumnAliases::default());

        assert!(rows.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_zero_rows_is_fine() {
        let raw = table(&["Symbol", "% Change"], &[]);
        let (rows, warnings) = extract(&raw, &ColumnAliases::default());
        assert!(rows.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unparseable_field_degrades_to_absent_with_warning() {
        let raw = table(
            &["Symbol", "Last Price", "Volume"],
            &[&["TSLA", "N/A", "12.3M"]],
        );

        let (rows, warnings) = extract(&raw, &ColumnAliases::default());

        assert_eq!(rows[0].last_price, None);
        assert_eq!(rows[0].volume, Some(12_300_000.0));
        assert_eq!(
            warnings,
            vec![RowWarning::UnparseableField {
                symbol: "TSLA".to_string(),
                field: "last_price",
                raw: "N/A".to_string(),
            }]
        );
    }

    #[test]
    fn test_ragged_row_missing_trailing_cells() {
        let raw = table(
            &["Symbol", "Last Price", "Volume"],
            &[&["NVDA", "875.30"]],
        );

        let (rows, warnings) = extract(&raw, &ColumnAliases::default());

        assert!(warnings.is_empty());
        assert_eq!(rows[0].last_price, Some(875.3));
        assert_eq!(rows[0].volume, None);
    }

    #[test]
    fn test_missing_column_is_absent_without_warning() {
        let raw = table(&["Symbol"], &[&["AMD"]]);

        let (rows, warnings) = extract(&raw, &ColumnAliases::default());

        assert!(warnings.is_empty());
        assert_eq!(rows[0].last_price, None);
        assert_eq!(rows[0].market_cap, None);
        assert_eq!(rows[0].company_name, "");
    }
}
