//! Joint search states, arena-allocated nodes and open-set entries.

use std::cmp::Ordering;

use mapfm_core::Agent;

/// A joint state: one agent per member of the current group, ordered
/// ascending by agent id. Banked waiting costs are part of the state's
/// identity: two states whose agents have banked different waits complete
/// at different costs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    agents: Vec<Agent>,
}

impl State {
    pub fn new(mut agents: Vec<Agent>) -> Self {
        agents.sort_by_key(|agent| agent.id);
        Self { agents }
    }

    /// Construct from agents already ordered by id (expansion preserves
    /// order, so children skip the sort).
    pub fn from_ordered(agents: Vec<Agent>) -> Self {
        debug_assert!(agents.windows(2).all(|w| w[0].id < w[1].id));
        Self { agents }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Handle of a node in its [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

/// A search node. `parent` is used only for path reconstruction and takes
/// part in no equality or hashing.
#[derive(Debug, Clone)]
pub struct Node {
    pub state: State,
    /// Accumulated cost.
    pub g: u32,
    /// Heuristic sum over agents.
    pub h: u32,
    /// Partial-expansion offset: the Δf target of the next expansion.
    pub delta_f: u32,
    /// Time step of this state.
    pub depth: u32,
    pub parent: Option<NodeId>,
}

/// Growable node pool. Parent links form a tree, so integer handles suffice
/// and the whole pool is released when the search ends.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Open-set entry. Ordered for a `BinaryHeap` so that the popped entry has
/// the least priority; ties prefer higher g (deeper search), then fewer
/// collision-avoidance hits, then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenEntry {
    pub priority: u32,
    pub g: u32,
    pub cat_hits: u32,
    pub seq: u64,
    pub node: NodeId,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap on priority.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.cat_hits.cmp(&self.cat_hits))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
