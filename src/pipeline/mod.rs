pub mod fetcher;
pub mod orchestrator;

pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use orchestrator::{Orchestrator, RunOutcome, RunStage, RunWarning};
