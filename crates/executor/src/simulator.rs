use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::Sender;
use tracing::{info, warn};

use super::config::SimulatorConfig;
use super::error::Error;
use super::types::{GraphJob, GraphStreamer};
use common::types::EdgeRecord;

/// Produces random signal-flow graphs for exercising the solver.
///
/// Every graph is a chain `x0 -> x1 -> ... -> x{stages-1}` plus random
/// forward skip edges and random feedback edges. Skips never enter `x0` and
/// feedback edges never leave the last node, so each graph keeps a unique
/// source and sink.
pub struct SimulatorStreamer {
    config: SimulatorConfig,
}

impl SimulatorStreamer {
    pub fn new(config: SimulatorConfig) -> Self {
        SimulatorStreamer { config }
    }

    fn random_gain(&self, rng: &mut SmallRng) -> f64 {
        let (lo, hi) = (self.config.min_gain, self.config.max_gain);
        if lo < hi { rng.random_range(lo..hi) } else { lo }
    }

    pub fn generate_graph(&self, rng: &mut SmallRng) -> Vec<EdgeRecord> {
        let stages = self.config.stages.max(2);
        let node = |i: usize| format!("x{}", i);

        let mut edges: Vec<EdgeRecord> = (0..stages - 1)
            .map(|i| EdgeRecord::new(node(i), node(i + 1), self.random_gain(rng)))
            .collect();

        if stages >= 3 {
            for _ in 0..self.config.skip_edges {
                let from = rng.random_range(0..stages - 2);
                let to = rng.random_range(from + 2..stages);
                edges.push(EdgeRecord::new(node(from), node(to), self.random_gain(rng)));
            }

            for _ in 0..self.config.feedback_edges {
                let from = rng.random_range(1..stages - 1);
                let to = rng.random_range(1..=from);
                edges.push(EdgeRecord::new(node(from), node(to), self.random_gain(rng)));
            }
        }

        edges
    }
}

#[async_trait]
impl GraphStreamer for SimulatorStreamer {
    /// Sends `graphs` generated edge lists, then returns.
    ///
    /// Backpressure is handled by awaiting on `sender.send()`. Exits early if
    /// the receiver is dropped.
    async fn run_stream(self, sender: Sender<GraphJob>) -> Result<(), Error> {
        let mut rng: SmallRng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        info!(
            graphs = self.config.graphs,
            stages = self.config.stages,
            "Simulator: starting"
        );

        for i in 0..self.config.graphs {
            let job = GraphJob {
                label: format!("sim-{}", i),
                edges: self.generate_graph(&mut rng),
            };

            if sender.send(job).await.is_err() {
                warn!("Simulator shutting down: worker receiver dropped");
                return Err(Error::ChannelSendFailed);
            }
        }

        Ok(())
    }
}
