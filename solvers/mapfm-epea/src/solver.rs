//! Solver facade: builds the heuristic, OSF tables and search context for a
//! validated problem and exposes one bounded-cost entry point.

use mapfm_core::{Agent, Path, Problem};
use tracing::debug;

use crate::cat::Cat;
use crate::epeastar::{EpeaStar, UNBOUNDED};
use crate::independence::IdSolver;
use crate::search_problem::SearchProblem;
use crate::stats::SolverStats;

/// How the joint search is decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One EPEA* search over all agents jointly.
    Epea,
    /// Independence detection: per-agent groups, merged on conflict.
    IndependenceDetection,
}

/// A conflict-free, color-respecting solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// One path per agent, in agent id order.
    pub paths: Vec<Path>,
    /// Sum of each agent's arrival time at its matched goal.
    pub cost: u32,
}

/// Cost-optimal MAPFM solver over a validated [`Problem`].
///
/// The heuristic distance fields and OSF tables are computed once at
/// construction and shared read-only by every search the solver runs.
pub struct MatchingSolver<'p> {
    search: SearchProblem<'p>,
    agents: Vec<Agent>,
    strategy: Strategy,
    stats: SolverStats,
}

impl<'p> MatchingSolver<'p> {
    pub fn new(problem: &'p Problem, strategy: Strategy) -> Self {
        let agents = problem
            .starts()
            .iter()
            .enumerate()
            .map(|(id, &(coord, color))| Agent::new(coord, color, id as u32))
            .collect();
        Self {
            search: SearchProblem::new(problem),
            agents,
            strategy,
            stats: SolverStats::default(),
        }
    }

    /// Solve under an optional inclusive cost bound.
    ///
    /// Returns `None` both when the instance is infeasible under the bound
    /// and when it is infeasible outright; the caller cannot distinguish
    /// the two and may retry with a wider bound.
    pub fn solve(&mut self, upper_bound: Option<u32>) -> Option<Solution> {
        self.solve_with_cat(upper_bound, None)
    }

    /// Like [`solve`](Self::solve), with an outer collision avoidance table
    /// consulted for tie-breaking only.
    pub fn solve_with_cat(
        &mut self,
        upper_bound: Option<u32>,
        outer_cat: Option<&Cat>,
    ) -> Option<Solution> {
        let max_cost = upper_bound.unwrap_or(UNBOUNDED);
        let result = match self.strategy {
            Strategy::Epea => {
                let cats: Vec<&Cat> = outer_cat.into_iter().collect();
                EpeaStar::new(&self.search, self.agents.clone(), &cats, max_cost)
                    .solve(&mut self.stats)
            }
            Strategy::IndependenceDetection => {
                IdSolver::new(&self.search, self.agents.clone(), outer_cat, max_cost)
                    .solve(&mut self.stats)
            }
        };
        match result {
            Some((paths, cost)) => {
                debug!(cost, "solve succeeded");
                Some(Solution { paths, cost })
            }
            None => {
                debug!(max_cost, "solve infeasible under bound");
                None
            }
        }
    }

    /// Counters accumulated over every search this solver has run.
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }
}
