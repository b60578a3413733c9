//! Validated MAPFM problem instances.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::agent::{Color, Goal};
use crate::coordinate::Coordinate;
use crate::grid::Grid;

/// Errors from constructing a problem instance. All inputs are rejected
/// here, before any search begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("agent count {agents} does not match goal count {goals}")]
    CountMismatch { agents: usize, goals: usize },

    #[error("agent {index} at ({x}, {y}) is out of bounds or blocked")]
    BadStart { index: usize, x: u32, y: u32 },

    #[error("goal {index} at ({x}, {y}) is out of bounds or blocked")]
    BadGoal { index: usize, x: u32, y: u32 },

    #[error("color {color} has {starts} start(s) but {goals} goal(s)")]
    ColorMismatch { color: Color, starts: usize, goals: usize },
}

/// A validated MAPFM instance: grid, agent starts and colored goals.
///
/// The matching between agents and same-colored goals is free; each agent
/// must end on *some* goal of its color.
#[derive(Debug, Clone)]
pub struct Problem {
    grid: Grid,
    starts: Vec<(Coordinate, Color)>,
    goals: Vec<Goal>,
}

impl Problem {
    /// Validate and build a problem instance.
    ///
    /// Rejects out-of-bounds or blocked starts and goals, an agent count
    /// differing from the goal count, and a color multiset of starts
    /// differing from that of the goals.
    pub fn new(
        grid: Grid,
        starts: Vec<(Coordinate, Color)>,
        goals: Vec<Goal>,
    ) -> Result<Self, ProblemError> {
        if starts.len() != goals.len() {
            return Err(ProblemError::CountMismatch {
                agents: starts.len(),
                goals: goals.len(),
            });
        }
        for (index, &(coord, _)) in starts.iter().enumerate() {
            if !grid.is_traversable(coord.x, coord.y) {
                return Err(ProblemError::BadStart {
                    index,
                    x: coord.x,
                    y: coord.y,
                });
            }
        }
        for (index, goal) in goals.iter().enumerate() {
            if !grid.is_traversable(goal.coord.x, goal.coord.y) {
                return Err(ProblemError::BadGoal {
                    index,
                    x: goal.coord.x,
                    y: goal.coord.y,
                });
            }
        }

        // Color multisets of starts and goals must agree.
        let mut colors: BTreeMap<Color, (usize, usize)> = BTreeMap::new();
        for &(_, color) in &starts {
            colors.entry(color).or_default().0 += 1;
        }
        for goal in &goals {
            colors.entry(goal.color).or_default().1 += 1;
        }
        for (&color, &(s, g)) in &colors {
            if s != g {
                return Err(ProblemError::ColorMismatch {
                    color,
                    starts: s,
                    goals: g,
                });
            }
        }

        Ok(Self { grid, starts, goals })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Agent starts in id order: agent `i` starts at `starts()[i]`.
    pub fn starts(&self) -> &[(Coordinate, Color)] {
        &self.starts
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }
}
