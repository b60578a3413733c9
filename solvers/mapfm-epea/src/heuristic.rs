//! Per-color shortest-distance fields.
//!
//! For each color present among the goals, a reverse breadth-first search
//! from all goals of that color yields the minimum grid distance from every
//! cell to the nearest same-colored goal. This field is the admissible
//! single-agent heuristic consumed by the OSF and the search.

use std::collections::VecDeque;

use mapfm_core::{Color, Coordinate, Goal, Grid, CARDINALS};
use rustc_hash::FxHashMap;

/// Distance value for cells that cannot reach any goal of the color.
pub const INFINITE: u32 = u32::MAX;

/// Shortest-path distance from every cell to the nearest goal of each color.
#[derive(Debug, Clone)]
pub struct ColorHeuristic {
    width: u32,
    fields: FxHashMap<Color, Vec<u32>>,
}

impl ColorHeuristic {
    /// Compute the distance field of every color present in `goals`.
    pub fn new(grid: &Grid, goals: &[Goal]) -> Self {
        let mut fields: FxHashMap<Color, Vec<u32>> = FxHashMap::default();
        for goal in goals {
            if !fields.contains_key(&goal.color) {
                let sources: Vec<Coordinate> = goals
                    .iter()
                    .filter(|g| g.color == goal.color)
                    .map(|g| g.coord)
                    .collect();
                fields.insert(goal.color, Self::flood(grid, &sources));
            }
        }
        Self {
            width: grid.width(),
            fields,
        }
    }

    /// Multi-source BFS through traversable cells, 4-connectivity.
    fn flood(grid: &Grid, sources: &[Coordinate]) -> Vec<u32> {
        let size = (grid.width() as usize) * (grid.height() as usize);
        let mut distances = vec![INFINITE; size];
        let mut queue = VecDeque::new();

        for &coord in sources {
            let index = (coord.y * grid.width() + coord.x) as usize;
            if distances[index] == INFINITE {
                distances[index] = 0;
                queue.push_back(coord);
            }
        }

        while let Some(coord) = queue.pop_front() {
            let here = distances[(coord.y * grid.width() + coord.x) as usize];
            for direction in CARDINALS {
                if let Some(next) = grid.step(coord, direction) {
                    let index = (next.y * grid.width() + next.x) as usize;
                    if distances[index] == INFINITE {
                        distances[index] = here + 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        distances
    }

    /// Distance from `coord` to the nearest goal of `color`, or [`INFINITE`].
    ///
    /// The color must occur among the problem's goals; problem validation
    /// guarantees this for every agent color.
    pub fn get(&self, color: Color, coord: Coordinate) -> u32 {
        self.fields[&color][(coord.y * self.width + coord.x) as usize]
    }

    /// Colors with a computed field, in ascending order.
    pub fn colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.fields.keys().copied().collect();
        colors.sort_unstable();
        colors
    }
}
