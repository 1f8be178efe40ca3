// ----------------------------
// Benchmark graph generators
// ----------------------------

use common::types::EdgeRecord;

/// Number of disjoint loops hung off the forward path by [`comb_edges`].
/// Every subset of them is a non-touching group, so the group count is 2^N - 1.
pub const NUM_TEETH: usize = 16;

/// Number of rungs in [`ladder_edges`].
pub const NUM_RUNGS: usize = 6;

pub const LOOP_GAIN: f64 = 0.5;

/// A "comb": forward path `in -> s0 -> ... -> out`, with a two-node loop
/// `ti <-> ui` fed from each stage. No tooth touches another tooth or the
/// forward path.
pub fn comb_edges(teeth: usize) -> Vec<EdgeRecord> {
    let mut edges = vec![EdgeRecord::new("in", "s0", 1.0)];
    for i in 0..teeth {
        let stage = format!("s{}", i);
        let next = format!("s{}", i + 1);
        let (t, u) = (format!("t{}", i), format!("u{}", i));

        edges.push(EdgeRecord::new(stage.clone(), next, 1.0));
        edges.push(EdgeRecord::new(stage, t.clone(), 1.0));
        edges.push(EdgeRecord::new(t.clone(), u.clone(), 1.0));
        // Slightly varied so the compiler cannot fold the gain products.
        edges.push(EdgeRecord::new(u, t, LOOP_GAIN + (i as f64) * 1e-6));
    }
    edges.push(EdgeRecord::new(format!("s{}", teeth), "out", 1.0));
    edges
}

/// A ladder: two parallel rails joined by forward rungs and local feedback,
/// giving many forward paths and many overlapping loops.
pub fn ladder_edges(rungs: usize) -> Vec<EdgeRecord> {
    let mut edges = vec![
        EdgeRecord::new("in", "a0", 1.0),
        EdgeRecord::new("in", "b0", 1.0),
    ];
    for i in 0..rungs {
        let (a, b) = (format!("a{}", i), format!("b{}", i));
        let (a_next, b_next) = (format!("a{}", i + 1), format!("b{}", i + 1));

        edges.push(EdgeRecord::new(a.clone(), a_next.clone(), 0.9));
        edges.push(EdgeRecord::new(b.clone(), b_next.clone(), 0.8));
        edges.push(EdgeRecord::new(a.clone(), b_next, 0.3));
        edges.push(EdgeRecord::new(a_next, a, -0.2));
        edges.push(EdgeRecord::new(b.clone(), b.clone(), 0.1));
    }
    edges.push(EdgeRecord::new(format!("a{}", rungs), "out", 1.0));
    edges.push(EdgeRecord::new(format!("b{}", rungs), "out", 1.0));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use mason_solver_core::{MasonSolver, SignalGraph, TransferSolver};

    #[test]
    fn comb_has_every_subset_as_a_group() {
        let graph = SignalGraph::from_edges(&comb_edges(4)).unwrap();
        let report = MasonSolver::default().solve(&graph).unwrap();

        assert_eq!(report.loops.len(), 4);
        assert_eq!(report.groups.len(), 15);
        assert_eq!(report.groups.max_order(), 4);
    }

    #[test]
    fn ladder_is_solvable() {
        let graph = SignalGraph::from_edges(&ladder_edges(3)).unwrap();
        let report = MasonSolver::default().solve(&graph).unwrap();

        assert!(report.forward_paths.len() > 2);
        assert!(report.transfer_function.is_finite());
    }
}
