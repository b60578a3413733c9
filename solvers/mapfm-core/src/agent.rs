//! Agents and colored goals.

use crate::coordinate::Coordinate;

/// Goal and agent colors. Agents may finish on any goal of their color.
pub type Color = u32;

/// A goal cell. The set of goals is immutable for the lifetime of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Goal {
    pub coord: Coordinate,
    pub color: Color,
}

impl Goal {
    pub fn new(coord: Coordinate, color: Color) -> Self {
        Self { coord, color }
    }
}

/// An agent within a search state.
///
/// `id` is assigned at problem construction and preserved across all derived
/// states. `waiting_cost` is the cost the agent has banked while sitting on a
/// goal of matching color; it is charged only if the agent later leaves that
/// goal, so an agent that settles on its goal contributes only its arrival
/// time to the solution cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Agent {
    pub coord: Coordinate,
    pub color: Color,
    pub id: u32,
    pub waiting_cost: u32,
}

impl Agent {
    pub fn new(coord: Coordinate, color: Color, id: u32) -> Self {
        Self {
            coord,
            color,
            id,
            waiting_cost: 0,
        }
    }
}
