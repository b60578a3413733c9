//! Collision avoidance tables and the set of committed paths.

use mapfm_core::{Coordinate, Path};
use rustc_hash::FxHashMap;

/// Aggregate occupancy record of committed paths.
///
/// Vertex counts answer "how many committed agents occupy this cell at time
/// t", edge counts "how many traverse from→to between t and t+1". An agent
/// whose path has ended is settled: it occupies its final coordinate at
/// every later time step.
#[derive(Debug, Default, Clone)]
pub struct Cat {
    vertices: FxHashMap<(Coordinate, u32), u32>,
    edges: FxHashMap<(Coordinate, Coordinate, u32), u32>,
    /// Final coordinate → times from which a committed path sits there.
    tails: FxHashMap<Coordinate, Vec<u32>>,
}

impl Cat {
    pub fn vertex_count(&self, coord: Coordinate, t: u32) -> u32 {
        let live = self.vertices.get(&(coord, t)).copied().unwrap_or(0);
        let settled = self
            .tails
            .get(&coord)
            .map(|starts| starts.iter().filter(|&&start| start <= t).count() as u32)
            .unwrap_or(0);
        live + settled
    }

    pub fn edge_count(&self, from: Coordinate, to: Coordinate, t: u32) -> u32 {
        self.edges.get(&(from, to, t)).copied().unwrap_or(0)
    }

    /// Register a committed path.
    pub fn add(&mut self, path: &Path) {
        let len = path.steps.len();
        for (t, &coord) in path.steps.iter().enumerate() {
            *self.vertices.entry((coord, t as u32)).or_insert(0) += 1;
        }
        for (t, window) in path.steps.windows(2).enumerate() {
            *self.edges.entry((window[0], window[1], t as u32)).or_insert(0) += 1;
        }
        let last = *path.steps.last().expect("path has at least one step");
        self.tails.entry(last).or_default().push(len as u32);
    }

    /// Withdraw a previously registered path.
    pub fn remove(&mut self, path: &Path) {
        let len = path.steps.len();
        for (t, &coord) in path.steps.iter().enumerate() {
            decrement(&mut self.vertices, (coord, t as u32));
        }
        for (t, window) in path.steps.windows(2).enumerate() {
            decrement(&mut self.edges, (window[0], window[1], t as u32));
        }
        let last = *path.steps.last().expect("path has at least one step");
        if let Some(starts) = self.tails.get_mut(&last) {
            if let Some(pos) = starts.iter().position(|&start| start == len as u32) {
                starts.swap_remove(pos);
            }
            if starts.is_empty() {
                self.tails.remove(&last);
            }
        }
    }
}

fn decrement<K: std::hash::Hash + Eq>(map: &mut FxHashMap<K, u32>, key: K) {
    if let Some(count) = map.get_mut(&key) {
        *count -= 1;
        if *count == 0 {
            map.remove(&key);
        }
    }
}

/// The committed paths of all currently solved groups, with their CAT.
#[derive(Debug)]
pub struct PathSet {
    paths: Vec<Option<Path>>,
    cat: Cat,
}

impl PathSet {
    pub fn new(agent_count: usize) -> Self {
        Self {
            paths: vec![None; agent_count],
            cat: Cat::default(),
        }
    }

    pub fn cat(&self) -> &Cat {
        &self.cat
    }

    /// Commit paths, replacing any previous path of the same agent.
    pub fn update(&mut self, new_paths: &[Path]) {
        for path in new_paths {
            let slot = &mut self.paths[path.agent as usize];
            if let Some(old) = slot.take() {
                self.cat.remove(&old);
            }
            self.cat.add(path);
            *slot = Some(path.clone());
        }
    }

    /// Withdraw the paths of a dissolving group.
    pub fn remove_agents(&mut self, agent_ids: &[u32]) {
        for &id in agent_ids {
            if let Some(old) = self.paths[id as usize].take() {
                self.cat.remove(&old);
            }
        }
    }
}
