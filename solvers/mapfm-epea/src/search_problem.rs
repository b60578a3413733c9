//! The joint search space for one agent group: goal tests, heuristic sums
//! and OSF-driven node expansion.

use mapfm_core::{Agent, Color, Coordinate, Direction, Grid, Problem};
use rustc_hash::FxHashSet;

use crate::heuristic::{ColorHeuristic, INFINITE};
use crate::node::State;
use crate::operator_finder::OperatorFinder;
use crate::osf::Osf;

/// A child state produced by expansion, before arena insertion.
#[derive(Debug)]
pub struct Child {
    pub state: State,
    pub g: u32,
    pub h: u32,
}

/// Grid, goals, per-color heuristic and OSF tables, built once per solve
/// and shared read-only by every search invocation.
pub struct SearchProblem<'p> {
    grid: &'p Grid,
    goals: FxHashSet<(Coordinate, Color)>,
    heuristic: ColorHeuristic,
    osf: Osf,
}

impl<'p> SearchProblem<'p> {
    pub fn new(problem: &'p Problem) -> Self {
        let grid = problem.grid();
        let heuristic = ColorHeuristic::new(grid, problem.goals());
        let osf = Osf::new(grid, &heuristic);
        let goals = problem
            .goals()
            .iter()
            .map(|goal| (goal.coord, goal.color))
            .collect();
        Self {
            grid,
            goals,
            heuristic,
            osf,
        }
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Is the agent standing on a goal of its own color?
    pub fn on_goal(&self, agent: &Agent) -> bool {
        self.goals.contains(&(agent.coord, agent.color))
    }

    /// A state is solved when every agent is on a matching-color goal.
    pub fn is_solved(&self, state: &State) -> bool {
        state.agents().iter().all(|agent| self.on_goal(agent))
    }

    /// How many agents of the state sit on matching-color goals.
    pub fn settled_count(&self, state: &State) -> u32 {
        state
            .agents()
            .iter()
            .filter(|agent| self.on_goal(agent))
            .count() as u32
    }

    /// Distance of one agent to its nearest matching goal.
    pub fn agent_heuristic(&self, agent: &Agent) -> u32 {
        self.heuristic.get(agent.color, agent.coord)
    }

    /// Heuristic sum over the state's agents; [`INFINITE`] if any agent can
    /// reach no goal of its color.
    pub fn heuristic(&self, state: &State) -> u32 {
        let mut total = 0u32;
        for agent in state.agents() {
            let h = self.agent_heuristic(agent);
            if h == INFINITE {
                return INFINITE;
            }
            total += h;
        }
        total
    }

    /// Apply one joint move to a parent state.
    ///
    /// Cost accounting per agent: a move or a wait off-goal charges one
    /// unit. A wait on a matching goal banks one unit instead of charging
    /// it; leaving a matching goal charges the banked waits plus the move,
    /// so time spent at the final goal is free exactly when it is never
    /// undone.
    pub fn make_child(&self, parent: &State, parent_g: u32, moves: &[Direction]) -> (State, u32) {
        debug_assert_eq!(moves.len(), parent.len());
        let mut g = parent_g;
        let mut agents = Vec::with_capacity(parent.len());
        for (agent, &direction) in parent.agents().iter().zip(moves) {
            let mut waiting_cost = 0;
            if self.on_goal(agent) {
                if direction == Direction::Wait {
                    waiting_cost = agent.waiting_cost + 1;
                } else {
                    g += agent.waiting_cost + 1;
                }
            } else {
                g += 1;
            }
            agents.push(Agent {
                coord: agent.coord.step(direction),
                color: agent.color,
                id: agent.id,
                waiting_cost,
            });
        }
        (State::from_ordered(agents), g)
    }

    /// Expand a node at Δf target `target`: enumerate joint operators whose
    /// Δf sum equals the target, build children, and drop any child with a
    /// vertex or edge conflict. Returns the surviving children and the next
    /// Δf target for the parent.
    pub fn expand(&self, parent: &State, parent_g: u32, target: u32) -> (Vec<Child>, u32) {
        let tables: Vec<_> = parent
            .agents()
            .iter()
            .map(|agent| self.osf.rows(agent.color, agent.coord))
            .collect();

        let mut finder = OperatorFinder::new(target, &tables);
        finder.search();

        let mut joint_moves: Vec<Vec<Direction>> = Vec::new();
        for tuple in &finder.tuples {
            let bundles: Vec<&[Direction]> = tuple
                .iter()
                .enumerate()
                .map(|(agent, &row)| tables[agent][row].directions.as_slice())
                .collect();
            expand_bundles(&bundles, &mut Vec::with_capacity(bundles.len()), &mut joint_moves);
        }

        let mut children = Vec::with_capacity(joint_moves.len());
        for moves in &joint_moves {
            let (state, g) = self.make_child(parent, parent_g, moves);
            if has_conflict(parent, &state) {
                continue;
            }
            let h = self.heuristic(&state);
            debug_assert_ne!(h, INFINITE, "child generated on an unreachable cell");
            children.push(Child { state, g, h });
        }
        (children, finder.next_target)
    }
}

/// Cartesian product over per-agent direction bundles.
fn expand_bundles(
    bundles: &[&[Direction]],
    current: &mut Vec<Direction>,
    out: &mut Vec<Vec<Direction>>,
) {
    if current.len() == bundles.len() {
        out.push(current.clone());
        return;
    }
    for &direction in bundles[current.len()] {
        current.push(direction);
        expand_bundles(bundles, current, out);
        current.pop();
    }
}

/// Vertex conflict: two agents share a cell in the child. Edge conflict:
/// two agents swap cells between parent and child.
fn has_conflict(parent: &State, child: &State) -> bool {
    let child_agents = child.agents();
    let parent_agents = parent.agents();
    let mut occupied = FxHashSet::default();
    for (i, agent) in child_agents.iter().enumerate() {
        if !occupied.insert(agent.coord) {
            return true;
        }
        for j in (i + 1)..parent_agents.len() {
            if child_agents[i].coord == parent_agents[j].coord
                && child_agents[j].coord == parent_agents[i].coord
            {
                return true;
            }
        }
    }
    false
}
