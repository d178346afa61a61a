use crate::extract::ColumnAliases;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for one pipeline run.
///
/// Everything that used to be a hard-coded constant — the source URL, the
/// output database, the request identity — is passed in here so the
/// orchestrator has no hidden global state.
///
/// # Fields
/// * `source_url`: Page holding the trending-tickers table
/// * `user_agent`: Identity sent with every outbound request; the source
///   rejects the default library agent
/// * `aliases`: Accepted raw header spellings per logical field
/// * `max_concurrent_lookups`: Worker bound for the enrichment stage
/// * `lookup_timeout`: Time budget per external lookup call
/// * `db_path`: SQLite file the persistence sink appends to
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_url: String,
    pub user_agent: String,
    pub aliases: ColumnAliases,
    pub max_concurrent_lookups: usize,
    pub lookup_timeout: Duration,
    pub db_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: "https://finance.yahoo.com/markets/stocks/trending/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            aliases: ColumnAliases::default(),
            max_concurrent_lookups: 4,
            lookup_timeout: Duration::from_secs(10),
            db_path: PathBuf::from("tickers.db"),
        }
    }
}

impl PipelineConfig {
    /// Builds a config from environment variables, falling back to the
    /// defaults for anything unset. `main` loads `.env` first.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("TICKER_PULSE_URL") {
            config.source_url = url;
        }
        if let Ok(agent) = env::var("TICKER_PULSE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Ok(db) = env::var("TICKER_PULSE_DB") {
            config.db_path = PathBuf::from(db);
        }
        if let Some(workers) = env::var("TICKER_PULSE_LOOKUP_WORKERS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.max_concurrent_lookups = workers.max(1);
        }
        if let Some(secs) = env::var("TICKER_PULSE_LOOKUP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.lookup_timeout = Duration::from_secs(secs);
        }

        config
    }
}
