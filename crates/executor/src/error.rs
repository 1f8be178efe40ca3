use thiserror::Error;

use common::error::Error as SolverError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Channel sender failed: Receiver has been dropped.")]
    ChannelSendFailed,

    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Solve task failed to complete: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),

    #[error("Graph processing error: {0}")]
    GraphError(#[from] SolverError),

    #[error("Usage: executor <sim|csv> [path_to_csv ...]")]
    Usage,
}
