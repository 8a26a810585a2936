//! Grid pathfinding using the A* algorithm.
//!
//! Units move on the four axis-aligned neighbours only. Every occupied cell
//! is impassable except the goal itself, so a unit can path up to (but never
//! onto) its target. Search is bounded by an expansion ceiling; hitting it,
//! or exhausting the open set, yields an empty path rather than an error.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::{BattleGrid, CellCoord};

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    col: u32,
    row: u32,
    /// g + h
    f_score: u32,
    /// Tie-breaker for determinism: lower coordinates first.
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for lowest f first.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction offsets for 4-directional movement.
const DIRECTIONS: [(i32, i32); 4] = [
    (1, 0),  // East
    (0, 1),  // South
    (-1, 0), // West
    (0, -1), // North
];

/// Manhattan distance heuristic (admissible for 4-directional movement).
#[inline]
fn manhattan_heuristic((c1, r1): CellCoord, (c2, r2): CellCoord) -> u32 {
    c1.abs_diff(c2) + r1.abs_diff(r2)
}

#[inline]
fn coords_to_tie_breaker(col: u32, row: u32) -> u64 {
    ((row as u64) << 32) | (col as u64)
}

/// Find a path from `start` to `goal` over unoccupied cells.
///
/// The returned path excludes `start` and ends with `goal`. It is empty when
/// `start == goal`, when either endpoint is off the grid, when no route
/// exists, or when more than `max_expansions` nodes would be expanded.
#[must_use]
pub fn find_path(
    grid: &BattleGrid,
    start: CellCoord,
    goal: CellCoord,
    max_expansions: usize,
) -> Vec<CellCoord> {
    if start == goal || !grid.in_bounds(start.0, start.1) || !grid.in_bounds(goal.0, goal.1) {
        return Vec::new();
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<CellCoord, CellCoord> = HashMap::new();
    let mut g_score: HashMap<CellCoord, u32> = HashMap::new();

    g_score.insert(start, 0);
    open_set.push(AStarNode {
        col: start.0,
        row: start.1,
        f_score: manhattan_heuristic(start, goal),
        tie_breaker: coords_to_tie_breaker(start.0, start.1),
    });

    let mut expanded = 0usize;

    while let Some(current) = open_set.pop() {
        let here = (current.col, current.row);

        if here == goal {
            return reconstruct_path(&came_from, start, goal);
        }

        let current_g = g_score.get(&here).copied().unwrap_or(u32::MAX);

        // Stale heap entry: a cheaper route to this cell was already expanded
        if current.f_score > current_g.saturating_add(manhattan_heuristic(here, goal)) {
            continue;
        }

        expanded += 1;
        if expanded > max_expansions {
            tracing::trace!(?start, ?goal, max_expansions, "path search hit expansion ceiling");
            return Vec::new();
        }

        for &(dc, dr) in &DIRECTIONS {
            let nc = current.col as i64 + dc as i64;
            let nr = current.row as i64 + dr as i64;
            if nc < 0 || nr < 0 {
                continue;
            }
            let next = (nc as u32, nr as u32);

            if !grid.in_bounds(next.0, next.1) {
                continue;
            }

            // Occupants block everything except the goal cell
            if next != goal && grid.is_occupied(next.0, next.1) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_score.get(&next).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(next, here);
                g_score.insert(next, tentative_g);
                open_set.push(AStarNode {
                    col: next.0,
                    row: next.1,
                    f_score: tentative_g + manhattan_heuristic(next, goal),
                    tie_breaker: coords_to_tie_breaker(next.0, next.1),
                });
            }
        }
    }

    Vec::new()
}

/// Walk `came_from` back from the goal, dropping the start cell.
fn reconstruct_path(
    came_from: &HashMap<CellCoord, CellCoord>,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
