use std::iter;

use common::error::Error;
use common::numeric_kernel::{alternating_sign, compensated_sum};
use common::types::{FeedbackLoop, ForwardPath};

use crate::groups::NonTouchingGroups;
use crate::limits::Budget;

/// Δ = 1 − Σ(order-1 gains) + Σ(order-2 gains) − Σ(order-3 gains) + …
pub fn calculate_delta(groups: &NonTouchingGroups) -> f64 {
    let terms = groups.iter().flat_map(|(order, groups)| {
        let sign = alternating_sign(order);
        groups.iter().map(move |group| sign * group.gain)
    });
    compensated_sum(iter::once(1.0).chain(terms))
}

/// Cofactor Δ_i of one forward path, with the groups it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Cofactor {
    pub value: f64,
    pub groups: NonTouchingGroups,
}

/// Computes Δ_i for `path`.
///
/// The loops touching the path are removed and the non-touching groups are
/// generated again over the loops that remain; Δ_i is the determinant of
/// that reduced loop set.
pub fn calculate_delta_for_path(
    path: &ForwardPath,
    loops: &[FeedbackLoop],
    budget: &mut Budget,
) -> Result<Cofactor, Error> {
    let remaining: Vec<&FeedbackLoop> = loops.iter().filter(|l| !l.touches_path(path)).collect();
    let groups = NonTouchingGroups::generate(&remaining, budget)?;

    Ok(Cofactor {
        value: calculate_delta(&groups),
        groups,
    })
}

#[cfg(test)]
mod delta_tests {
    use super::*;
    use common::types::LoopId;

    fn lp(id: usize, nodes: &[usize], gain: f64) -> FeedbackLoop {
        FeedbackLoop::new(LoopId(id), nodes.to_vec(), gain)
    }

    fn groups_of(loops: &[FeedbackLoop]) -> NonTouchingGroups {
        let refs: Vec<&FeedbackLoop> = loops.iter().collect();
        NonTouchingGroups::generate(&refs, &mut Budget::unbounded()).unwrap()
    }

    #[test]
    fn no_loops_gives_unity() {
        assert_eq!(calculate_delta(&NonTouchingGroups::default()), 1.0);
    }

    #[test]
    fn touching_loops_subtract_only() {
        let loops = [lp(0, &[0, 1, 2], 24.0), lp(1, &[1, 2, 3], 15.0)];
        assert_eq!(calculate_delta(&groups_of(&loops)), -38.0);
    }

    #[test]
    fn second_order_term_is_added() {
        let loops = [lp(0, &[4, 5], 0.5), lp(1, &[6, 7], 0.3)];
        let delta = calculate_delta(&groups_of(&loops));

        assert!((delta - (1.0 - 0.8 + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn third_order_term_is_subtracted() {
        let loops = [lp(0, &[0], 2.0), lp(1, &[1], 3.0), lp(2, &[2], 5.0)];
        // 1 - 10 + (6 + 10 + 15) - 30
        assert_eq!(calculate_delta(&groups_of(&loops)), -8.0);
    }

    #[test]
    fn cofactor_drops_loops_touching_the_path() {
        let loops = [
            lp(0, &[1, 2], 0.5),
            lp(1, &[4, 5], 0.2),
            lp(2, &[6], 0.1),
        ];
        let path = ForwardPath {
            nodes: vec![0, 1, 3],
            gain: 2.0,
        };

        let cofactor = calculate_delta_for_path(&path, &loops, &mut Budget::unbounded()).unwrap();

        // Remaining: L1 and L2, non-touching.
        assert!((cofactor.value - (1.0 - 0.3 + 0.02)).abs() < 1e-12);
        assert_eq!(cofactor.groups.order(1).len(), 2);
        assert_eq!(cofactor.groups.order(2)[0].members, vec![LoopId(1), LoopId(2)]);
    }

    #[test]
    fn cofactor_is_unity_when_every_loop_touches() {
        let loops = [lp(0, &[0, 1, 2], 24.0), lp(1, &[1, 2, 3], 15.0)];
        let path = ForwardPath {
            nodes: vec![0, 1, 2, 3],
            gain: 30.0,
        };

        let cofactor = calculate_delta_for_path(&path, &loops, &mut Budget::unbounded()).unwrap();
        assert_eq!(cofactor.value, 1.0);
        assert!(cofactor.groups.is_empty());
    }
}
