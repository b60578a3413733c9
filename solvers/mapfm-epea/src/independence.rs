//! Independence detection: solve agents in small groups, merge groups whose
//! paths conflict, and re-solve the merged group until the joint solution
//! is conflict-free.

use mapfm_core::{Agent, Path};
use tracing::debug;

use crate::cat::{Cat, PathSet};
use crate::epeastar::{EpeaStar, UNBOUNDED};
use crate::heuristic::INFINITE;
use crate::search_problem::SearchProblem;
use crate::stats::SolverStats;

/// A set of agents currently solved jointly, with its committed cost.
/// Groups partition the agent set at all times.
struct Group {
    agents: Vec<Agent>,
    cost: u32,
}

/// First pair of agent ids whose committed paths conflict, scanning
/// left-to-right in ascending id order.
fn find_conflict(paths: &[Option<Path>]) -> Option<(u32, u32)> {
    let committed: Vec<&Path> = paths.iter().flatten().collect();
    for i in 0..committed.len() {
        for j in (i + 1)..committed.len() {
            if committed[i].conflicts(committed[j]) {
                return Some((committed[i].agent, committed[j].agent));
            }
        }
    }
    None
}

/// Independence-detection meta-search wrapping [`EpeaStar`].
pub struct IdSolver<'a, 'p> {
    problem: &'a SearchProblem<'p>,
    agents: Vec<Agent>,
    outer_cat: Option<&'a Cat>,
    max_cost: u32,
}

impl<'a, 'p> IdSolver<'a, 'p> {
    pub fn new(
        problem: &'a SearchProblem<'p>,
        agents: Vec<Agent>,
        outer_cat: Option<&'a Cat>,
        max_cost: u32,
    ) -> Self {
        Self {
            problem,
            agents,
            outer_cat,
            max_cost,
        }
    }

    /// Solve the full problem. Returns one path per agent in id order and
    /// the total cost, or `None` when no solution exists within the bound.
    pub fn solve(self, stats: &mut SolverStats) -> Option<(Vec<Path>, u32)> {
        let slot_count = self
            .agents
            .iter()
            .map(|agent| agent.id as usize + 1)
            .max()
            .unwrap_or(0);
        let mut path_set = PathSet::new(slot_count);
        let mut paths: Vec<Option<Path>> = vec![None; slot_count];
        let mut groups: Vec<Group> = Vec::with_capacity(self.agents.len());

        // Seed the running total with each unsolved agent's heuristic lower
        // bound, so every group search gets the tightest budget the bound
        // allows; bounds are swapped for real costs as groups are solved.
        let mut total: u32 = 0;
        for agent in &self.agents {
            let h = self.problem.agent_heuristic(agent);
            if h == INFINITE {
                return None;
            }
            total += h;
        }

        for agent in &self.agents {
            total -= self.problem.agent_heuristic(agent);
            let (group_paths, cost) =
                self.solve_group(vec![*agent], total, &path_set, stats)?;
            path_set.update(&group_paths);
            paths[agent.id as usize] = Some(group_paths[0].clone());
            groups.push(Group {
                agents: vec![*agent],
                cost,
            });
            total += cost;
        }

        while let Some((a, b)) = find_conflict(&paths) {
            debug!(agent_a = a, agent_b = b, "conflicting groups, merging");
            total = self.merge(
                a,
                b,
                total,
                &mut groups,
                &mut paths,
                &mut path_set,
                stats,
            )?;
            stats.merges += 1;
        }

        let result: Vec<Path> = paths.into_iter().flatten().collect();
        debug_assert_eq!(result.len(), self.agents.len());
        Some((result, total))
    }

    /// Run EPEA* for one group under the budget left by `committed`.
    fn solve_group(
        &self,
        group_agents: Vec<Agent>,
        committed: u32,
        path_set: &PathSet,
        stats: &mut SolverStats,
    ) -> Option<(Vec<Path>, u32)> {
        let budget = if self.max_cost == UNBOUNDED {
            UNBOUNDED
        } else if committed > self.max_cost {
            return None;
        } else {
            self.max_cost - committed
        };
        let cats: Vec<&Cat> = self
            .outer_cat
            .into_iter()
            .chain(std::iter::once(path_set.cat()))
            .collect();
        EpeaStar::new(self.problem, group_agents, &cats, budget).solve(stats)
    }

    /// Dissolve the two groups owning the conflicting agents, re-solve
    /// their union, and commit the new paths. Returns the new total cost.
    #[allow(clippy::too_many_arguments)]
    fn merge(
        &self,
        agent_a: u32,
        agent_b: u32,
        mut total: u32,
        groups: &mut Vec<Group>,
        paths: &mut [Option<Path>],
        path_set: &mut PathSet,
        stats: &mut SolverStats,
    ) -> Option<u32> {
        let index_a = groups
            .iter()
            .position(|group| group.agents.iter().any(|agent| agent.id == agent_a))
            .expect("conflicting agent belongs to no group");
        let index_b = groups
            .iter()
            .position(|group| group.agents.iter().any(|agent| agent.id == agent_b))
            .expect("conflicting agent belongs to no group");
        assert_ne!(
            index_a, index_b,
            "conflict between agents {} and {} inside one group",
            agent_a, agent_b
        );

        let group_b = groups.remove(index_b);
        let index_a = if index_b < index_a { index_a - 1 } else { index_a };

        total -= groups[index_a].cost + group_b.cost;

        let mut merged = groups[index_a].agents.clone();
        merged.extend(group_b.agents);
        merged.sort_by_key(|agent| agent.id);

        // Withdraw the dissolved groups' paths before re-solving, so the
        // merged search does not count collision hits against itself.
        let merged_ids: Vec<u32> = merged.iter().map(|agent| agent.id).collect();
        path_set.remove_agents(&merged_ids);

        let (group_paths, cost) = self.solve_group(merged.clone(), total, path_set, stats)?;

        path_set.update(&group_paths);
        for path in &group_paths {
            paths[path.agent as usize] = Some(path.clone());
        }
        debug!(group_size = merged.len(), cost, "merged group solved");
        groups[index_a] = Group {
            agents: merged,
            cost,
        };
        Some(total + cost)
    }
}
