use common::error::{Error, Resource};
use common::numeric_kernel::finite_product;
use common::types::{FeedbackLoop, NonTouchingGroup};

use crate::limits::Budget;

/// Non-touching loop groups, bucketed by order (number of member loops).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NonTouchingGroups {
    by_order: Vec<Vec<NonTouchingGroup>>,
}

impl NonTouchingGroups {
    /// Builds every set of pairwise non-touching loops from `loops`, order by order.
    ///
    /// Order 1 is every loop on its own. A group of order `k + 1` is a group
    /// of order `k` extended by a loop positioned after its last member that
    /// touches none of the existing members, so each pair inside the new
    /// group has been checked. Extending only past the last member means every
    /// set of loops is reached by exactly one construction, keyed by its
    /// ascending member handles. Generation stops at the first order that
    /// yields no group.
    ///
    /// `loops` must be in ascending `LoopId` order.
    ///
    /// # Errors
    /// `Error::ResourceExceeded` when the group or search-step budget runs
    /// out, `Error::NumericOverflow` when a group gain is not finite.
    pub fn generate(loops: &[&FeedbackLoop], budget: &mut Budget) -> Result<Self, Error> {
        let mut by_order: Vec<Vec<NonTouchingGroup>> = Vec::new();
        let mut recorded = 0usize;

        // Positions into `loops` with the running product of their gains.
        let mut frontier: Vec<(Vec<usize>, f64)> = loops
            .iter()
            .enumerate()
            .map(|(i, l)| (vec![i], l.gain))
            .collect();

        while !frontier.is_empty() {
            recorded += frontier.len();
            budget.admit(Resource::Groups, recorded)?;

            let order = by_order.len() + 1;
            let mut next = Vec::new();

            if order < loops.len() {
                for (positions, gain) in &frontier {
                    let Some(&last) = positions.last() else {
                        continue;
                    };
                    for candidate in last + 1..loops.len() {
                        budget.step()?;
                        let touches_member = positions
                            .iter()
                            .any(|&p| loops[p].touches(loops[candidate]));
                        if touches_member {
                            continue;
                        }

                        let extended_gain = finite_product([*gain, loops[candidate].gain])
                            .ok_or(Error::NumericOverflow {
                                context: "non-touching group gain",
                            })?;
                        let mut extended = positions.clone();
                        extended.push(candidate);
                        next.push((extended, extended_gain));
                    }
                }
            }

            by_order.push(
                frontier
                    .into_iter()
                    .map(|(positions, gain)| NonTouchingGroup {
                        members: positions.iter().map(|&p| loops[p].id).collect(),
                        gain,
                    })
                    .collect(),
            );
            frontier = next;
        }

        Ok(NonTouchingGroups { by_order })
    }

    /// Groups of the given order; empty for orders that were never reached.
    pub fn order(&self, order: usize) -> &[NonTouchingGroup] {
        order
            .checked_sub(1)
            .and_then(|i| self.by_order.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Highest order with at least one group.
    pub fn max_order(&self) -> usize {
        self.by_order.len()
    }

    /// `(order, groups)` pairs, lowest order first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[NonTouchingGroup])> {
        self.by_order
            .iter()
            .enumerate()
            .map(|(i, groups)| (i + 1, groups.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_order.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_order.is_empty()
    }
}
