pub mod delta;
pub mod graph;
pub mod groups;
pub mod limits;
pub mod loops;
pub mod paths;
pub mod report;
pub mod solver;
pub mod traits;

pub use graph::SignalGraph;
pub use limits::SolverLimits;
pub use report::TransferReport;
pub use solver::MasonSolver;
pub use traits::TransferSolver;
