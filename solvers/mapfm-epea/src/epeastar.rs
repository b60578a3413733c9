//! Enhanced Partial-Expansion A* over joint states of one agent group.
//!
//! Instead of generating all children of a popped node, only those whose
//! joint Δf equals the node's current target are built; the node then goes
//! back into the open set with the next achievable target. Nodes live in a
//! growable arena and reference their parents by handle, so the whole
//! search tree is dropped at once when the search returns.

use std::collections::hash_map::Entry;
use std::collections::BinaryHeap;

use mapfm_core::{Agent, Coordinate, Path};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cat::Cat;
use crate::heuristic::INFINITE;
use crate::node::{Arena, Node, NodeId, OpenEntry, State};
use crate::operator_finder::NO_NEXT_TARGET;
use crate::search_problem::SearchProblem;
use crate::stats::SolverStats;

/// Bound value meaning "no cost bound".
pub const UNBOUNDED: u32 = u32::MAX;

/// One bounded-cost EPEA* search over the joint states of a group.
pub struct EpeaStar<'a, 'p> {
    problem: &'a SearchProblem<'p>,
    agents: Vec<Agent>,
    cats: &'a [&'a Cat],
    /// Inclusive bound: nodes whose queue priority exceeds this are never
    /// enqueued.
    max_cost: u32,
}

impl<'a, 'p> EpeaStar<'a, 'p> {
    pub fn new(
        problem: &'a SearchProblem<'p>,
        agents: Vec<Agent>,
        cats: &'a [&'a Cat],
        max_cost: u32,
    ) -> Self {
        Self {
            problem,
            agents,
            cats,
            max_cost,
        }
    }

    /// Run the search. Returns one path per agent (in id order) and the
    /// solution cost, or `None` when no solution exists within the bound.
    pub fn solve(self, stats: &mut SolverStats) -> Option<(Vec<Path>, u32)> {
        stats.searches += 1;
        debug!(
            agents = self.agents.len(),
            max_cost = self.max_cost,
            "starting EPEA* search"
        );

        let root_state = State::new(self.agents.clone());
        let root_h = self.problem.heuristic(&root_state);
        if root_h == INFINITE || root_h > self.max_cost {
            // Some agent cannot reach any matching goal, or even the
            // heuristic lower bound exceeds the budget.
            return None;
        }

        let mut arena = Arena::default();
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
        let mut closed: FxHashMap<State, u32> = FxHashMap::default();
        let mut seq: u64 = 0;

        let root = arena.push(Node {
            state: root_state.clone(),
            g: 0,
            h: root_h,
            delta_f: 0,
            depth: 0,
            parent: None,
        });
        closed.insert(root_state, 0);
        open.push(OpenEntry {
            priority: root_h,
            g: 0,
            cat_hits: 0,
            seq,
            node: root,
        });

        while let Some(entry) = open.pop() {
            let (state, g, h, delta_f, depth) = {
                let node = arena.get(entry.node);
                (node.state.clone(), node.g, node.h, node.delta_f, node.depth)
            };

            // A cheaper route to this state was found after this entry was
            // queued; the entry is stale.
            if closed.get(&state).is_some_and(|&best| best < g) {
                continue;
            }

            stats.nodes_popped += 1;

            if self.problem.is_solved(&state) {
                debug!(cost = g, nodes = arena.len(), "search solved");
                return Some(reconstruct(&arena, entry.node, g));
            }

            let (children, next_target) = self.problem.expand(&state, g, delta_f);
            assert!(
                next_target > delta_f,
                "partial expansion did not advance: next target {} <= {}",
                next_target,
                delta_f
            );

            let parent_coords: Vec<Coordinate> =
                state.agents().iter().map(|agent| agent.coord).collect();

            for child in children {
                let f = child.g.saturating_add(child.h);
                if f > self.max_cost {
                    continue;
                }
                match closed.entry(child.state.clone()) {
                    Entry::Occupied(mut best) => {
                        if child.g >= *best.get() {
                            continue;
                        }
                        best.insert(child.g);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(child.g);
                    }
                }
                let cat_hits = self.cat_hits(&parent_coords, &child.state, depth + 1);
                let id = arena.push(Node {
                    state: child.state,
                    g: child.g,
                    h: child.h,
                    delta_f: 0,
                    depth: depth + 1,
                    parent: Some(entry.node),
                });
                seq += 1;
                open.push(OpenEntry {
                    priority: f,
                    g: child.g,
                    cat_hits,
                    seq,
                    node: id,
                });
                stats.nodes_generated += 1;
            }

            if next_target != NO_NEXT_TARGET {
                // A wait on a matching goal is banked rather than charged,
                // so a child generated at target Δf can come in below
                // g + h + Δf by one unit per settled agent. Deflate the
                // queue key by that slack to keep it a lower bound on the
                // remaining descendants; the raw Δf still drives the
                // operator finder.
                let slack = self.problem.settled_count(&state);
                let priority = g
                    .saturating_add(h)
                    .saturating_add(next_target.saturating_sub(slack));
                arena.get_mut(entry.node).delta_f = next_target;
                if priority <= self.max_cost {
                    seq += 1;
                    open.push(OpenEntry {
                        priority,
                        g,
                        cat_hits: entry.cat_hits,
                        seq,
                        node: entry.node,
                    });
                    stats.reinsertions += 1;
                }
            }
        }

        debug!(max_cost = self.max_cost, "open set exhausted under bound");
        None
    }

    /// Tie-break score of a freshly generated child: committed occupancy of
    /// each destination cell plus opposing traversals of each moved edge.
    fn cat_hits(&self, parent_coords: &[Coordinate], child: &State, t: u32) -> u32 {
        if self.cats.is_empty() {
            return 0;
        }
        let mut hits = 0;
        for (agent, &from) in child.agents().iter().zip(parent_coords) {
            for cat in self.cats {
                hits += cat.vertex_count(agent.coord, t);
                if agent.coord != from {
                    hits += cat.edge_count(agent.coord, from, t - 1);
                }
            }
        }
        hits
    }
}

/// Walk parent handles from the solved node to the root and emit one
/// time-indexed path per agent. Trailing waits on the final goal are
/// trimmed: they were banked, never charged, and the collision tables treat
/// a finished agent as settled on its final cell anyway.
fn reconstruct(arena: &Arena, goal: NodeId, cost: u32) -> (Vec<Path>, u32) {
    let mut chain = vec![goal];
    while let Some(parent) = arena.get(*chain.last().expect("chain is non-empty")).parent {
        chain.push(parent);
    }
    chain.reverse();

    let goal_agents = arena.get(goal).state.agents();
    let mut paths = Vec::with_capacity(goal_agents.len());
    for (index, agent) in goal_agents.iter().enumerate() {
        let mut steps: Vec<Coordinate> = chain
            .iter()
            .map(|&id| arena.get(id).state.agents()[index].coord)
            .collect();
        while steps.len() > 1 && steps[steps.len() - 1] == steps[steps.len() - 2] {
            steps.pop();
        }
        paths.push(Path::new(agent.id, steps));
    }
    (paths, cost)
}
