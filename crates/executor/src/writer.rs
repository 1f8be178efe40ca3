use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch;
use tracing::info;

use super::error::Error;
use super::types::SolveOutcome;

/// Totals reported once the writer stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub solved: usize,
    pub failed: usize,
}

/// Async consumer that prints every solve outcome to stdout.
pub struct Writer {
    receiver: Receiver<SolveOutcome>,
    shutdown: watch::Receiver<()>, // signal for graceful shutdown
    diagnostics: bool,
}

impl Writer {
    pub fn new(
        receiver: Receiver<SolveOutcome>,
        shutdown: watch::Receiver<()>,
        diagnostics: bool,
    ) -> Self {
        Self {
            receiver,
            shutdown,
            diagnostics,
        }
    }

    /// Run the writer asynchronously.
    ///
    /// Exits when the outcome channel is closed or the shutdown signal is received.
    pub async fn process_outcomes(mut self) -> Result<RunSummary, Error> {
        info!("Writer ready.");
        let mut summary = RunSummary::default();

        loop {
            select! {
                outcome = self.receiver.recv() => {
                    match outcome {
                        Some(outcome) => {
                            if outcome.result.is_ok() {
                                summary.solved += 1;
                            } else {
                                summary.failed += 1;
                            }
                            println!("{}", render(&outcome, self.diagnostics));
                        }
                        None => {
                            info!("Receiver closed, shutting down writer.");
                            break;
                        }
                    }
                }

                Ok(()) = self.shutdown.changed() => {
                    info!("Shutdown signal received, stopping writer.");
                    break;
                }
            }
        }

        Ok(summary)
    }

    /// Spawns the Writer task onto the Tokio runtime.
    pub fn spawn_task(self) -> tokio::task::JoinHandle<Result<RunSummary, Error>> {
        tokio::spawn(self.process_outcomes())
    }
}

/// Text block for one outcome; `diagnostics` adds the per-path group breakdown.
pub fn render(outcome: &SolveOutcome, diagnostics: bool) -> String {
    match &outcome.result {
        Ok(report) if diagnostics => format!("=== {} ===\n{:#}", outcome.label, report),
        Ok(report) => format!("=== {} ===\n{}", outcome.label, report),
        Err(e) => format!("=== {} ===\nFailed ({}): {}\n", outcome.label, e.kind(), e),
    }
}
