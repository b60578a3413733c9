//! Joint-operator enumeration with Δf-sum pruning.
//!
//! Given one OSF table per agent and a target sum, enumerates every
//! assignment of one row per agent whose Δf values sum to the target
//! exactly. This runs in every expanded node, so both prunes matter: the
//! lower-bound prune cuts a whole subtree as soon as no later choice can
//! stay within the target, and the upper-bound prune skips rows that cannot
//! reach it.

use crate::osf::OsfTable;

/// Sentinel for "no larger Δf sum is achievable".
pub const NO_NEXT_TARGET: u32 = u32::MAX;

/// Enumerates row-index tuples whose Δf sum equals a target value.
pub struct OperatorFinder<'t> {
    target: u32,
    tables: &'t [&'t OsfTable],
    /// Minimum achievable Δf sum over all agents strictly after index i.
    min_tail: Vec<u32>,
    /// Maximum achievable Δf sum over all agents strictly after index i.
    max_tail: Vec<u32>,
    /// Accepted tuples: one OSF row index per agent, summing to `target`.
    pub tuples: Vec<Vec<usize>>,
    /// Smallest achievable sum strictly greater than `target`, or
    /// [`NO_NEXT_TARGET`].
    pub next_target: u32,
}

impl<'t> OperatorFinder<'t> {
    /// Precompute the tail bounds for `tables`, one table per agent.
    ///
    /// Every table must be non-empty: an empty table marks a cell no live
    /// agent may occupy, so reaching this point with one is a search bug.
    pub fn new(target: u32, tables: &'t [&'t OsfTable]) -> Self {
        let mut min_tail = Vec::with_capacity(tables.len());
        let mut max_tail = Vec::with_capacity(tables.len());
        let mut min_sum = 0;
        let mut max_sum = 0;
        for table in tables.iter().rev() {
            assert!(!table.is_empty(), "agent on a cell with an empty OSF table");
            min_tail.push(min_sum);
            max_tail.push(max_sum);
            min_sum += table[0].delta_f;
            max_sum += table[table.len() - 1].delta_f;
        }
        min_tail.reverse();
        max_tail.reverse();

        Self {
            target,
            tables,
            min_tail,
            max_tail,
            tuples: Vec::new(),
            next_target: NO_NEXT_TARGET,
        }
    }

    /// Run the enumeration. On return, `tuples` holds every accepted
    /// row-index tuple and `next_target` the smallest achievable sum above
    /// the target.
    pub fn search(&mut self) {
        if self.tables.is_empty() {
            return;
        }
        let mut picks = Vec::with_capacity(self.tables.len());
        self.descend(0, 0, &mut picks);
        assert!(
            self.next_target > self.target,
            "operator finder produced next target {} <= target {}",
            self.next_target,
            self.target
        );
    }

    fn descend(&mut self, agent: usize, sum: u32, picks: &mut Vec<usize>) {
        let tables = self.tables;
        let table: &OsfTable = tables[agent];
        let last_agent = agent == tables.len() - 1;
        for (row_index, row) in table.iter().enumerate() {
            let current = sum + row.delta_f;

            // Rows are ascending, so once the minimum completion overshoots
            // the target, every later row overshoots further; the first
            // overshoot is a candidate for the next target value.
            let floor = current + self.min_tail[agent];
            if floor > self.target {
                self.next_target = self.next_target.min(floor);
                return;
            }

            if last_agent {
                if current == self.target {
                    picks.push(row_index);
                    self.tuples.push(picks.clone());
                    picks.pop();
                }
                continue;
            }

            // Even the maximum completion falls short; try a larger row.
            if current + self.max_tail[agent] < self.target {
                continue;
            }

            picks.push(row_index);
            self.descend(agent + 1, current, picks);
            picks.pop();
        }
    }
}
