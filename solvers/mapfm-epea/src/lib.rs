//! Cost-optimal solver for Multi-Agent Path Finding with Matching (MAPFM).
//!
//! Agents must each reach *some* goal of their own color; the assignment of
//! agents to same-colored goals is free. The engine combines:
//!
//! - **EPEA\***: partial-expansion A* over joint states, generating only the
//!   children whose surplus Δf matches the parent's current target;
//! - an **operator selection function** precomputed per color and cell,
//!   listing moves bundled by Δf;
//! - a pruned **operator finder** that assembles joint moves hitting a Δf
//!   target exactly;
//! - **independence detection**, which solves agents in minimal groups and
//!   merges groups only when their paths conflict.
//!
//! Construct a [`MatchingSolver`] from a validated [`mapfm_core::Problem`]
//! and call [`MatchingSolver::solve`] with an optional cost bound.

mod cat;
mod epeastar;
mod heuristic;
mod independence;
mod node;
mod operator_finder;
mod osf;
mod search_problem;
mod solver;
mod stats;

pub use cat::{Cat, PathSet};
pub use epeastar::{EpeaStar, UNBOUNDED};
pub use heuristic::{ColorHeuristic, INFINITE};
pub use independence::IdSolver;
pub use node::State;
pub use operator_finder::{OperatorFinder, NO_NEXT_TARGET};
pub use osf::{Osf, OsfRow, OsfTable};
pub use search_problem::{Child, SearchProblem};
pub use solver::{MatchingSolver, Solution, Strategy};
pub use stats::SolverStats;
