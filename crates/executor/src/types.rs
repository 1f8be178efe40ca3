use std::path::PathBuf;
use tokio::sync::mpsc::Sender;

use super::error::Error;
use common::error::Error as SolverError;
use common::types::EdgeRecord;
use mason_solver_core::TransferReport;

/// A trait defining the contract for any source that produces signal-flow
/// graphs for the solve pipeline.
///
/// This trait decouples the Producer task from the specific data source
/// (CSV files vs. simulated graphs).
///
/// The trait bounds (`Send`, `Sync`, `'static`) let the implementation run on
/// the multi-threaded Tokio runtime.
#[async_trait::async_trait]
pub trait GraphStreamer: Send + Sync + 'static {
    async fn run_stream(self, sender: Sender<GraphJob>) -> Result<(), Error>;
}

/// One edge list to be solved, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct GraphJob {
    pub label: String,
    pub edges: Vec<EdgeRecord>,
}

/// Result of solving one [`GraphJob`].
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub label: String,
    pub result: Result<TransferReport, SolverError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Sim,
    Csv(Vec<PathBuf>),
}
