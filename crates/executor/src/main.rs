pub mod config;
pub mod csv_streamer;
pub mod error;
pub mod producer;
pub mod simulator;
pub mod types;
pub mod worker;
pub mod writer;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use csv_streamer::CsvStreamer;
use error::Error;
use mason_solver_core::MasonSolver;
use producer::Producer;
use simulator::SimulatorStreamer;
use types::{DataSource, GraphJob, SolveOutcome};
use worker::SolveWorker;
use writer::{RunSummary, Writer};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(summary) => {
            info!(
                solved = summary.solved,
                failed = summary.failed,
                "Pipeline shut down."
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunSummary, Error> {
    let source = parse_args(env::args().collect())?;
    let config = config::load_config()?;

    let solver = MasonSolver::new(config.solver.limits, config.solver.singular_epsilon);

    let (job_sender, job_receiver) = mpsc::channel::<GraphJob>(config.executor.buffer_size);
    let (outcome_sender, outcome_receiver) =
        mpsc::channel::<SolveOutcome>(config.executor.buffer_size);
    let (shutdown_sender, shutdown_receiver) = watch::channel(());

    // Spawn tasks
    let producer_handle =
        spawn_producer(&source, job_sender, shutdown_receiver.clone(), &config);
    let worker_handle = SolveWorker::new(
        solver,
        config.solver.duplicate_edges,
        config.executor.max_concurrent_solves,
        job_receiver,
        outcome_sender,
        shutdown_receiver.clone(),
    )
    .spawn_task();
    let writer_handle =
        Writer::new(outcome_receiver, shutdown_receiver, config.solver.diagnostics).spawn_task();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender.send(());
        }
    });

    let (producer_result, worker_result, writer_result) =
        tokio::join!(producer_handle, worker_handle, writer_handle);

    producer_result??;
    worker_result??;
    writer_result?
}

/// Parse command-line arguments to determine the data source.
fn parse_args(args: Vec<String>) -> Result<DataSource, Error> {
    let source = args
        .get(1)
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "sim".to_string());

    match source.as_str() {
        "sim" => Ok(DataSource::Sim),
        "csv" => {
            let paths: Vec<PathBuf> = args.iter().skip(2).map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(Error::Usage);
            }
            Ok(DataSource::Csv(paths))
        }
        _ => Err(Error::Usage),
    }
}

fn spawn_producer(
    source: &DataSource,
    sender: mpsc::Sender<GraphJob>,
    shutdown: watch::Receiver<()>,
    config: &config::Config,
) -> JoinHandle<Result<(), Error>> {
    match source {
        DataSource::Sim => {
            info!("Starting SimulatorStreamer producer task...");
            let streamer = SimulatorStreamer::new(config.simulator.clone());
            Producer::new(streamer).spawn(sender, shutdown)
        }
        DataSource::Csv(paths) => {
            info!("Starting CsvStreamer producer task...");
            let streamer = CsvStreamer::new(paths.clone());
            Producer::new(streamer).spawn(sender, shutdown)
        }
    }
}
