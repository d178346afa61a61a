//! HTML table recognition.
//!
//! The source page is plain HTML whose table markup changes between
//! revisions (with or without `<thead>`, varying cell tags). This module
//! extracts the first recognizable table into a [`RawTable`] of labeled
//! cells and nothing more; all interpretation happens in the row extractor.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

/// An ordered, untyped table pulled out of the source page.
///
/// `headers` are the column names exactly as the page printed them;
/// `rows` hold one cell vec per body row. Rows may be ragged — shorter or
/// longer than the header row — and consumers must zip defensively.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Pairs the cells of row `index` with their column names.
    ///
    /// Extra cells beyond the header count are dropped; missing trailing
    /// cells are simply not yielded, so callers see them as absent.
    pub fn labeled_row(&self, index: usize) -> impl Iterator<Item = (&str, &str)> {
        self.rows
            .get(index)
            .map(|cells| cells.as_slice())
            .unwrap_or(&[])
            .iter()
            .zip(self.headers.iter())
            .map(|(cell, header)| (header.as_str(), cell.as_str()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Parses the first recognizable `<table>` out of a fetched page.
///
/// Headers come from `<thead> th` cells when present, otherwise from the
/// first row of the table. Body rows are every remaining `<tr>`, with
/// cell text whitespace-collapsed.
///
/// # Errors
/// Returns an error when the document contains no table or the table has
/// no header row — fatal for the run, since nothing can be extracted.
pub fn parse_first_table(html: &str) -> Result<RawTable> {
    let document = Html::parse_document(html);
    // Selectors are static and known-valid.
    let table_sel = Selector::parse("table").unwrap();
    let header_sel = Selector::parse("thead th").unwrap();
    let tbody_row_sel = Selector::parse("tbody tr").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("th, td").unwrap();
    let th_sel = Selector::parse("th").unwrap();

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| anyhow!("no table found in fetched page"))?;

    let mut headers: Vec<String> = table.select(&header_sel).map(cell_text).collect();

    let body_candidates: Vec<ElementRef> = {
        let tbody: Vec<ElementRef> = table.select(&tbody_row_sel).collect();
        if tbody.is_empty() {
            table.select(&row_sel).collect()
        } else {
            tbody
        }
    };

    let mut body_rows: Vec<Vec<String>> = Vec::new();
    for tr in body_candidates {
        let cells: Vec<String> = tr.select(&cell_sel).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if headers.is_empty() {
            // No <thead>: the first non-empty row is the header row.
            headers = cells;
            continue;
        }
        // A row made entirely of <th> cells is a header row, not data.
        if tr.select(&th_sel).count() == cells.len() {
            continue;
        }
        body_rows.push(cells);
    }

    if headers.is_empty() {
        return Err(anyhow!("table has no recognizable header row"));
    }

    Ok(RawTable {
        headers,
        rows: body_rows,
    })
}

/// Collapses an element's text nodes into a single trimmed string.
fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
