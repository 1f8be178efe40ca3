use std::hint::black_box;
use std::time::Instant;

use common::types::FeedbackLoop;
use mason_solver_core::SignalGraph;
use mason_solver_core::delta::calculate_delta;
use mason_solver_core::groups::NonTouchingGroups;
use mason_solver_core::limits::Budget;
use mason_solver_core::loops::find_all_loops;
use perf_bench::*;

fn main() {
    let graph = match SignalGraph::from_edges(&comb_edges(NUM_TEETH)) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Failed to build benchmark graph: {}", e);
            return;
        }
    };
    let mut budget = Budget::unbounded();
    let loops = match find_all_loops(&graph, &mut budget) {
        Ok(loops) => loops,
        Err(e) => {
            eprintln!("Loop enumeration failed: {}", e);
            return;
        }
    };
    let refs: Vec<&FeedbackLoop> = loops.iter().collect();

    let start_time = Instant::now();
    let groups = match NonTouchingGroups::generate(&refs, &mut budget) {
        Ok(groups) => groups,
        Err(e) => {
            eprintln!("Group generation failed: {}", e);
            return;
        }
    };
    let delta = calculate_delta(&groups);
    let elapsed_time = start_time.elapsed();

    let final_delta = black_box(delta);

    println!("--- Non-touching Group Benchmark ({} loops) ---", loops.len());
    println!("Groups: {} (max order {})", groups.len(), groups.max_order());
    println!("Delta: {:.10}", final_delta);
    println!("Elapsed Time: {:?}", elapsed_time);
}
