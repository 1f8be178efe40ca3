use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::warn;

use common::error::{Error, Resource};

/// How often (in search steps) the wall-clock deadline is consulted.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Upper bounds on the combinatorial work a single solve may do.
///
/// Loop enumeration and non-touching group generation are exponential in the
/// worst case; these bounds make an oversized graph fail with
/// [`Error::ResourceExceeded`] instead of running unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverLimits {
    pub max_nodes: usize,
    pub max_paths: usize,
    pub max_loops: usize,
    /// Groups recorded by one generation (all orders together).
    pub max_groups: usize,
    /// DFS edge expansions and group extension attempts across one solve.
    pub max_search_steps: u64,
    pub deadline_ms: Option<u64>,
}

impl Default for SolverLimits {
    fn default() -> Self {
        SolverLimits {
            max_nodes: 64,
            max_paths: 100_000,
            max_loops: 10_000,
            max_groups: 1_000_000,
            max_search_steps: 50_000_000,
            deadline_ms: None,
        }
    }
}

impl SolverLimits {
    pub fn unbounded() -> Self {
        SolverLimits {
            max_nodes: usize::MAX,
            max_paths: usize::MAX,
            max_loops: usize::MAX,
            max_groups: usize::MAX,
            max_search_steps: u64::MAX,
            deadline_ms: None,
        }
    }
}

/// Running account of one solve against its [`SolverLimits`].
#[derive(Debug)]
pub struct Budget {
    limits: SolverLimits,
    steps: u64,
    deadline: Option<Instant>,
}

impl Budget {
    pub fn new(limits: SolverLimits) -> Self {
        let deadline = limits
            .deadline_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        Budget {
            limits,
            steps: 0,
            deadline,
        }
    }

    pub fn unbounded() -> Self {
        Budget::new(SolverLimits::unbounded())
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Charges one unit of search work.
    pub fn step(&mut self) -> Result<(), Error> {
        self.steps += 1;
        if self.steps > self.limits.max_search_steps {
            return Err(exceeded(
                Resource::SearchSteps,
                self.limits.max_search_steps,
            ));
        }
        if self.steps % DEADLINE_CHECK_INTERVAL == 0 {
            self.check_deadline()?;
        }
        Ok(())
    }

    pub fn check_deadline(&self) -> Result<(), Error> {
        match (self.deadline, self.limits.deadline_ms) {
            (Some(deadline), Some(ms)) if Instant::now() >= deadline => {
                Err(exceeded(Resource::Deadline, ms))
            }
            _ => Ok(()),
        }
    }

    /// Fails when `count` items of `resource` would exceed the configured bound.
    pub fn admit(&self, resource: Resource, count: usize) -> Result<(), Error> {
        let limit = match resource {
            Resource::Nodes => self.limits.max_nodes,
            Resource::Paths => self.limits.max_paths,
            Resource::Loops => self.limits.max_loops,
            Resource::Groups => self.limits.max_groups,
            Resource::SearchSteps | Resource::Deadline => return Ok(()),
        };
        if count > limit {
            return Err(exceeded(resource, limit as u64));
        }
        Ok(())
    }
}

fn exceeded(resource: Resource, limit: u64) -> Error {
    warn!(%resource, limit, "enumeration budget exhausted");
    Error::ResourceExceeded { resource, limit }
}

#[cfg(test)]
mod limits_tests {
    use super::*;

    #[test]
    fn step_budget_is_enforced() {
        let limits = SolverLimits {
            max_search_steps: 3,
            ..SolverLimits::default()
        };
        let mut budget = Budget::new(limits);

        for _ in 0..3 {
            budget.step().unwrap();
        }
        let err = budget.step().unwrap_err();
        assert_eq!(
            err,
            Error::ResourceExceeded {
                resource: Resource::SearchSteps,
                limit: 3
            }
        );
    }

    #[test]
    fn admit_compares_against_the_matching_limit() {
        let limits = SolverLimits {
            max_loops: 2,
            ..SolverLimits::default()
        };
        let budget = Budget::new(limits);

        assert!(budget.admit(Resource::Loops, 2).is_ok());
        assert!(budget.admit(Resource::Loops, 3).is_err());
        assert!(budget.admit(Resource::Paths, 3).is_ok());
    }

    #[test]
    fn expired_deadline_is_reported() {
        let limits = SolverLimits {
            deadline_ms: Some(0),
            ..SolverLimits::default()
        };
        let budget = Budget::new(limits);

        let err = budget.check_deadline().unwrap_err();
        assert_eq!(
            err,
            Error::ResourceExceeded {
                resource: Resource::Deadline,
                limit: 0
            }
        );
    }

    #[test]
    fn no_deadline_never_expires() {
        let budget = Budget::new(SolverLimits::default());
        assert!(budget.check_deadline().is_ok());
    }
}
