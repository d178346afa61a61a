use super::fetcher::PageFetcher;
use crate::config::PipelineConfig;
use crate::enrich::{EnrichmentResolver, EnrichmentWarning};
use crate::extract::{extract, parse_first_table, RowWarning};
use crate::snapshot::{assemble, MarketSnapshot};
use crate::storage::SnapshotSink;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Where a run currently is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Fetching,
    Extracting,
    Enriching,
    Assembling,
    Done,
    Failed,
}

/// A non-fatal problem accumulated during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunWarning {
    Row(RowWarning),
    Enrichment(EnrichmentWarning),
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::Row(w) => w.fmt(f),
            RunWarning::Enrichment(w) => w.fmt(f),
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub snapshot: MarketSnapshot,
    pub warnings: Vec<RunWarning>,
}

/// Sequences one capture run: fetch → extract → enrich → assemble →
/// persist.
///
/// Only two things can fail a run: the source page being unreachable and
/// the page containing no recognizable table. Everything after extraction
/// degrades instead of failing — dropped rows, absent fields, and failed
/// lookups become warnings carried in the outcome.
pub struct Orchestrator {
    config: PipelineConfig,
    fetcher: Arc<dyn PageFetcher>,
    resolver: EnrichmentResolver,
    sink: Box<dyn SnapshotSink>,
    stage: RunStage,
}

impl Orchestrator {
    /// Creates an orchestrator over its collaborators.
    ///
    /// # Arguments
    /// * `config`: Source URL, aliases, and tuning knobs for this run
    /// * `fetcher`: Page retrieval collaborator
    /// * `resolver`: Per-ticker enrichment
    /// * `sink`: Persistence collaborator, called once per completed run
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn PageFetcher>,
        resolver: EnrichmentResolver,
        sink: Box<dyn SnapshotSink>,
    ) -> Self {
        Self {
            config,
            fetcher,
            resolver,
            sink,
            stage: RunStage::Idle,
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Executes one capture run end to end.
    ///
    /// # Errors
    /// Returns an error — and leaves the stage at `Failed` with nothing
    /// persisted — when the source page cannot be fetched or contains no
    /// recognizable table. All other faults are absorbed into warnings.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.stage = RunStage::Fetching;
        tracing::info!(url = %self.config.source_url, "fetching source page");
        let html = match self.fetcher.fetch(&self.config.source_url).await {
            Ok(html) => html,
            Err(err) => {
                self.stage = RunStage::Failed;
                return Err(err.context("fetching the source page failed"));
            }
        };

        self.stage = RunStage::Extracting;
        let table = match parse_first_table(&html) {
            Ok(table) => table,
            Err(err) => {
                self.stage = RunStage::Failed;
                return Err(err.context("source page had no recognizable table"));
            }
        };
        let (rows, row_warnings) = extract(&table, &self.config.aliases);
        tracing::info!(
            extracted = rows.len(),
            dropped = table.row_count() - rows.len(),
            "extraction complete"
        );

        self.stage = RunStage::Enriching;
        let symbols: Vec<String> = rows.iter().map(|row| row.symbol.clone()).collect();
        let (enrichments, enrichment_warnings) = self.resolver.resolve_all(&symbols).await;

        self.stage = RunStage::Assembling;
        let snapshot = assemble(Utc::now(), rows, &enrichments);

        self.sink
            .append(&snapshot)
            .context("persisting the snapshot failed")?;

        self.stage = RunStage::Done;

        let warnings = row_warnings
            .into_iter()
            .map(RunWarning::Row)
            .chain(enrichment_warnings.into_iter().map(RunWarning::Enrichment))
            .collect();

        Ok(RunOutcome { snapshot, warnings })
    }
}
