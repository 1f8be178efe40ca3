use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio::sync::watch;
use tracing::info;

use super::error::Error;
use super::types::{GraphJob, GraphStreamer};
use super::worker::shutdown_requested;

pub struct Producer<S: GraphStreamer> {
    streamer: S,
}

impl<S> Producer<S>
where
    S: GraphStreamer,
{
    pub fn new(streamer: S) -> Self {
        Producer { streamer }
    }

    /// Runs the streamer until it finishes or shutdown is signalled.
    ///
    /// A streamer that fails because the worker dropped its receiver during
    /// shutdown counts as a clean stop.
    pub fn spawn(
        self,
        sender: Sender<GraphJob>,
        shutdown: watch::Receiver<()>,
    ) -> tokio::task::JoinHandle<Result<(), Error>> {
        info!("Producer ready.");
        let mut stop = shutdown.clone();

        tokio::spawn(async move {
            select! {
                result = self.streamer.run_stream(sender) => match result {
                    Err(Error::ChannelSendFailed) if shutdown_requested(&shutdown) => {
                        info!("Worker stopped on shutdown, producer finished.");
                        Ok(())
                    }
                    other => other,
                },
                Ok(()) = stop.changed() => {
                    info!("Shutdown signal received, stopping producer.");
                    Ok(())
                }
            }
        })
    }
}
