use std::hint::black_box;
use std::time::Instant;

use mason_solver_core::{MasonSolver, SignalGraph, TransferSolver};
use perf_bench::*;

fn main() {
    let graph = match SignalGraph::from_edges(&ladder_edges(NUM_RUNGS)) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Failed to build benchmark graph: {}", e);
            return;
        }
    };
    let solver = MasonSolver::default();

    let start_time = Instant::now();
    let result = solver.solve(&graph);
    let elapsed_time = start_time.elapsed();

    match black_box(result) {
        Ok(report) => {
            println!("--- Full Solve Benchmark ({} rungs) ---", NUM_RUNGS);
            println!(
                "Forward paths: {}, loops: {}, groups: {}",
                report.forward_paths.len(),
                report.loops.len(),
                report.groups.len()
            );
            println!("Transfer function: {:.10}", report.transfer_function);
            println!("Elapsed Time: {:?}", elapsed_time);
        }
        Err(e) => eprintln!("Solve failed after {:?}: {}", elapsed_time, e),
    }
}
