//! Operator selection function tables.
//!
//! For every (color, cell) pair, the OSF lists the available moves grouped
//! by their Δf contribution, ascending: picking a move with Δf = d from a
//! cell raises the node's f-estimate by exactly d for that agent. The
//! operator finder walks these rows to assemble joint moves whose Δf sum
//! hits a target value.

use mapfm_core::{Color, Coordinate, Direction, Grid, CARDINALS};
use rustc_hash::FxHashMap;

use crate::heuristic::{ColorHeuristic, INFINITE};

/// One OSF row: the bundle of directions sharing a Δf value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsfRow {
    pub directions: Vec<Direction>,
    pub delta_f: u32,
}

/// Rows for one cell, sorted ascending by Δf. Empty for cells no agent of
/// the color may ever occupy (infinite heuristic or blocked).
pub type OsfTable = Vec<OsfRow>;

/// All OSF tables for a problem, indexed by color and cell.
#[derive(Debug, Clone)]
pub struct Osf {
    width: u32,
    tables: FxHashMap<Color, Vec<OsfTable>>,
}

impl Osf {
    /// Precompute the table of every traversable, reachable cell for every
    /// goal color.
    pub fn new(grid: &Grid, heuristic: &ColorHeuristic) -> Self {
        let size = (grid.width() as usize) * (grid.height() as usize);
        let mut tables = FxHashMap::default();

        for color in heuristic.colors() {
            let mut color_tables: Vec<OsfTable> = Vec::with_capacity(size);
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let coord = Coordinate::new(x, y);
                    let h = if grid.is_traversable(x, y) {
                        heuristic.get(color, coord)
                    } else {
                        INFINITE
                    };
                    if h == INFINITE {
                        color_tables.push(Vec::new());
                    } else {
                        color_tables.push(generate_table(grid, heuristic, color, coord, h));
                    }
                }
            }
            tables.insert(color, color_tables);
        }

        Self {
            width: grid.width(),
            tables,
        }
    }

    /// The OSF rows for an agent of `color` standing at `coord`.
    pub fn rows(&self, color: Color, coord: Coordinate) -> &OsfTable {
        &self.tables[&color][(coord.y * self.width + coord.x) as usize]
    }
}

/// Build and collapse the table for a single cell.
fn generate_table(
    grid: &Grid,
    heuristic: &ColorHeuristic,
    color: Color,
    coord: Coordinate,
    h: u32,
) -> OsfTable {
    let mut expanded: Vec<(Direction, u32)> = Vec::with_capacity(5);
    for direction in CARDINALS {
        if let Some(next) = grid.step(coord, direction) {
            let next_h = heuristic.get(color, next);
            if next_h == INFINITE {
                // A move onto an unreachable cell can never lead to a goal.
                continue;
            }
            // Adjacent finite distances differ by at most one, so this
            // cannot underflow.
            debug_assert!(next_h + 1 >= h);
            let delta_f = 1 + next_h - h;
            expanded.push((direction, delta_f));
        }
    }
    expanded.push((Direction::Wait, 1));
    // Row order drives the operator finder; ascending Δf is load-bearing.
    expanded.sort_by_key(|&(_, delta_f)| delta_f);
    collapse(expanded)
}

/// Collapse consecutive equal-Δf entries into direction bundles.
fn collapse(expanded: Vec<(Direction, u32)>) -> OsfTable {
    let mut table: OsfTable = Vec::new();
    for (direction, delta_f) in expanded {
        match table.last_mut() {
            Some(row) if row.delta_f == delta_f => row.directions.push(direction),
            _ => table.push(OsfRow {
                directions: vec![direction],
                delta_f,
            }),
        }
    }
    table
}
