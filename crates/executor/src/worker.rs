use std::ops::ControlFlow;

use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use super::error::Error;
use super::types::{GraphJob, SolveOutcome};
use common::types::DuplicateEdges;
use mason_solver_core::{SignalGraph, TransferSolver};

/// Pulls graph jobs off the channel and solves them on Tokio's blocking pool.
///
/// Solves are CPU-bound and independent, so up to `max_concurrent` of them
/// run at once. Outcomes are forwarded in completion order.
pub struct SolveWorker<S> {
    solver: S,
    duplicate_edges: DuplicateEdges,
    max_concurrent: usize,
    receiver: Receiver<GraphJob>,
    sender: Sender<SolveOutcome>,
    shutdown: watch::Receiver<()>,
}

impl<S> SolveWorker<S>
where
    S: TransferSolver + Clone + Send + Sync + 'static,
{
    pub fn new(
        solver: S,
        duplicate_edges: DuplicateEdges,
        max_concurrent: usize,
        receiver: Receiver<GraphJob>,
        sender: Sender<SolveOutcome>,
        shutdown: watch::Receiver<()>,
    ) -> Self {
        SolveWorker {
            solver,
            duplicate_edges,
            max_concurrent: max_concurrent.max(1),
            receiver,
            sender,
            shutdown,
        }
    }

    /// Runs until the job channel closes and every in-flight solve is reported.
    ///
    /// A shutdown signal stops the worker cleanly: no further jobs are taken
    /// and solves still in flight are abandoned.
    pub async fn process_jobs(mut self) -> Result<(), Error> {
        info!(max_concurrent = self.max_concurrent, "Solve worker ready.");
        let mut in_flight: JoinSet<SolveOutcome> = JoinSet::new();

        loop {
            let job = select! {
                job = self.receiver.recv() => job,
                Ok(()) = self.shutdown.changed() => {
                    info!(abandoned = in_flight.len(), "Shutdown signal received, stopping solve worker.");
                    return Ok(());
                }
            };
            let Some(job) = job else {
                break;
            };

            while in_flight.len() >= self.max_concurrent {
                if let Some(joined) = in_flight.join_next().await {
                    if self.forward(joined).await?.is_break() {
                        return Ok(());
                    }
                }
            }

            let solver = self.solver.clone();
            let policy = self.duplicate_edges;
            debug!(label = %job.label, edges = job.edges.len(), "Dispatching solve");
            in_flight.spawn_blocking(move || solve_job(&solver, policy, job));
        }

        while let Some(joined) = in_flight.join_next().await {
            if self.forward(joined).await?.is_break() {
                return Ok(());
            }
        }

        info!("Job channel closed, solve worker finished.");
        Ok(())
    }

    /// Sends one outcome on. Breaks when the writer has already gone away
    /// because shutdown was requested.
    async fn forward(
        &self,
        joined: Result<SolveOutcome, JoinError>,
    ) -> Result<ControlFlow<()>, Error> {
        let outcome = joined?;
        if let Err(e) = &outcome.result {
            warn!(label = %outcome.label, kind = e.kind(), error = %e, "Solve failed");
        }
        if self.sender.send(outcome).await.is_ok() {
            return Ok(ControlFlow::Continue(()));
        }
        if shutdown_requested(&self.shutdown) {
            info!("Writer stopped on shutdown, solve worker finished.");
            return Ok(ControlFlow::Break(()));
        }
        Err(Error::ChannelSendFailed)
    }

    pub fn spawn_task(self) -> tokio::task::JoinHandle<Result<(), Error>> {
        tokio::spawn(self.process_jobs())
    }
}

/// True once the shutdown signal has fired and not yet been consumed.
pub fn shutdown_requested(shutdown: &watch::Receiver<()>) -> bool {
    shutdown.has_changed().unwrap_or(false)
}

/// Builds the graph for `job` and solves it; both failure kinds land in the outcome.
pub fn solve_job<S: TransferSolver>(
    solver: &S,
    duplicate_edges: DuplicateEdges,
    job: GraphJob,
) -> SolveOutcome {
    let result = SignalGraph::from_edges_with_policy(&job.edges, duplicate_edges)
        .and_then(|graph| solver.solve(&graph));

    SolveOutcome {
        label: job.label,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::Error as SolverError;
    use common::types::EdgeRecord;
    use crate::writer::Writer;
    use mason_solver_core::MasonSolver;
    use tokio::sync::mpsc;

    fn job(label: &str, edges: &[(&str, &str, f64)]) -> GraphJob {
        GraphJob {
            label: label.to_string(),
            edges: edges
                .iter()
                .map(|&(from, to, gain)| EdgeRecord::new(from, to, gain))
                .collect(),
        }
    }

    #[test]
    fn test_solve_job_reports_transfer_function() {
        let outcome = solve_job(
            &MasonSolver::default(),
            DuplicateEdges::Replace,
            job("chain", &[("A", "B", 2.0), ("B", "C", 3.0), ("C", "D", 1.0)]),
        );

        assert_eq!(outcome.label, "chain");
        assert_eq!(outcome.result.unwrap().transfer_function, 6.0);
    }

    #[test]
    fn test_solve_job_applies_duplicate_policy() {
        let edges = [("A", "B", 2.0), ("A", "B", 3.0)];

        let replaced = solve_job(&MasonSolver::default(), DuplicateEdges::Replace, job("r", &edges));
        let summed = solve_job(&MasonSolver::default(), DuplicateEdges::Sum, job("s", &edges));

        assert_eq!(replaced.result.unwrap().transfer_function, 3.0);
        assert_eq!(summed.result.unwrap().transfer_function, 5.0);
    }

    #[test]
    fn test_solve_job_keeps_graph_errors() {
        let outcome = solve_job(
            &MasonSolver::default(),
            DuplicateEdges::Replace,
            job("bad", &[("A", "B", f64::INFINITY)]),
        );

        assert!(matches!(
            outcome.result,
            Err(SolverError::NonFiniteGain { .. })
        ));
    }

    #[tokio::test]
    async fn test_worker_solves_every_job() {
        let (job_tx, job_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(());
        let worker = SolveWorker::new(
            MasonSolver::default(),
            DuplicateEdges::Replace,
            2,
            job_rx,
            out_tx,
            shutdown_rx,
        );
        let handle = worker.spawn_task();

        job_tx.send(job("ok", &[("A", "B", 4.0)])).await.unwrap();
        job_tx
            .send(job("split", &[("A", "C", 2.0), ("B", "C", 3.0), ("C", "D", 1.0)]))
            .await
            .unwrap();
        job_tx
            .send(job("singular", &[("A", "B", 1.0), ("B", "B", 1.0), ("B", "C", 1.0)]))
            .await
            .unwrap();
        drop(job_tx);

        let mut outcomes = Vec::new();
        while let Some(outcome) = out_rx.recv().await {
            outcomes.push(outcome);
        }
        handle.await.unwrap().unwrap();

        outcomes.sort_by(|a, b| a.label.cmp(&b.label));
        let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["ok", "singular", "split"]);

        assert_eq!(outcomes[0].result.as_ref().unwrap().transfer_function, 4.0);
        assert!(matches!(
            outcomes[1].result,
            Err(SolverError::SingularGraph { .. })
        ));
        assert!(matches!(
            outcomes[2].result,
            Err(SolverError::GraphTopology { .. })
        ));
    }

    /// Once shutdown fires the writer drops its receiver; the worker must
    /// still finish with `Ok` while jobs keep arriving.
    #[tokio::test]
    async fn test_worker_stops_cleanly_on_shutdown() {
        let (job_tx, job_rx) = mpsc::channel(8);
        let (out_tx, out_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let writer_handle = Writer::new(out_rx, shutdown_rx.clone(), false).spawn_task();
        let worker_handle = SolveWorker::new(
            MasonSolver::default(),
            DuplicateEdges::Replace,
            1,
            job_rx,
            out_tx,
            shutdown_rx,
        )
        .spawn_task();

        shutdown_tx.send(()).unwrap();
        let summary = writer_handle.await.unwrap().unwrap();
        assert_eq!(summary.solved + summary.failed, 0);

        for i in 0..5 {
            let label = format!("late-{}", i);
            if job_tx.send(job(&label, &[("A", "B", 1.0)])).await.is_err() {
                break;
            }
        }

        let result = worker_handle.await.unwrap();
        assert!(result.is_ok(), "worker failed after shutdown: {:?}", result);
        assert!(job_tx.is_closed());
    }
}
