//! A* search over the implicit 16-neighbour step grid.
//!
//! The coordinate space is continuous, so the closed set and best-g map key
//! on the step-quantised grid cell, and a short recency window of the last
//! few expanded cells stops trivial bounce-back oscillation. Together these
//! make the search terminate on realistic inputs.

use crate::geo::{
    self, euclidean, grid_key, GridKey, COMPASS_ANGLES, STEP,
};
use crate::models::{Position, Region};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// How many recently-expanded cells a neighbour must avoid.
const RECENCY_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy)]
struct Node {
    position: Position,
    g: f64,
    parent: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Heap entry: minimum f first, FIFO within equal f so the fixed compass
/// order decides ties and the resulting path is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: FloatOrd,
    seq: u64,
    node: usize,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f.cmp(&other.f).then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Lower bound on the remaining moves to the goal.
fn heuristic(position: Position, goal: Position) -> f64 {
    euclidean(position, goal) / STEP
}

/// Step-by-step path from `start` to within one step of `goal`, avoiding
/// every well-formed region. Returns the empty vector when no route exists
/// or either endpoint is invalid.
pub fn find_path(start: Position, goal: Position, regions: &[Region]) -> Vec<Position> {
    if !start.is_valid() || !goal.is_valid() {
        return Vec::new();
    }

    let mut nodes: Vec<Node> = vec![Node {
        position: start,
        g: 0.0,
        parent: None,
    }];
    let mut open: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
    let mut seq = 0u64;
    open.push(Reverse(OpenEntry {
        f: FloatOrd(heuristic(start, goal)),
        seq,
        node: 0,
    }));

    let mut closed: HashSet<GridKey> = HashSet::new();
    let mut best_g: HashMap<GridKey, f64> = HashMap::new();
    best_g.insert(grid_key(start), 0.0);
    let mut recent: VecDeque<GridKey> = VecDeque::with_capacity(RECENCY_WINDOW);

    while let Some(Reverse(entry)) = open.pop() {
        let current = nodes[entry.node];
        let current_key = grid_key(current.position);
        if !closed.insert(current_key) {
            continue;
        }
        recent.push_back(current_key);
        if recent.len() > RECENCY_WINDOW {
            recent.pop_front();
        }

        if euclidean(current.position, goal) < geo::CLOSE_THRESHOLD {
            return reconstruct(&nodes, entry.node);
        }

        for angle in COMPASS_ANGLES {
            let Ok(neighbour) = geo::next_position(current.position, angle) else {
                continue;
            };
            let key = grid_key(neighbour);
            if closed.contains(&key) {
                continue;
            }
            if !geo::is_valid_move(current.position, neighbour, regions) {
                continue;
            }
            if recent.contains(&key) {
                continue;
            }

            let tentative = current.g + STEP;
            if tentative < best_g.get(&key).copied().unwrap_or(f64::INFINITY) {
                best_g.insert(key, tentative);
                nodes.push(Node {
                    position: neighbour,
                    g: tentative,
                    parent: Some(entry.node),
                });
                seq += 1;
                open.push(Reverse(OpenEntry {
                    f: FloatOrd(tentative + heuristic(neighbour, goal)),
                    seq,
                    node: nodes.len() - 1,
                }));
            }
        }
    }

    Vec::new()
}

fn reconstruct(nodes: &[Node], end: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(end);
    while let Some(idx) = cursor {
        path.push(nodes[idx].position);
        cursor = nodes[idx].parent;
    }
    path.reverse();
    path
}
