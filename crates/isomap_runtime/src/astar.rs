//! A* shortest path search over a [`GridGraph`]

use crate::grid::GridGraph;
use isomap_core::GridCoord;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::f64::consts::SQRT_2;

/// Outcome of a search. An unreachable goal is `found == false` with an empty path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Start to goal, both inclusive
    pub path: Vec<GridCoord>,
    pub found: bool,
    pub cost: f64,
}

impl PathResult {
    fn not_found() -> Self {
        Self {
            path: Vec::new(),
            found: false,
            cost: 0.0,
        }
    }
}

/// Octile distance: exact cost on an open 8-way grid
fn heuristic(a: GridCoord, b: GridCoord) -> f64 {
    let dx = (a.col - b.col).unsigned_abs() as f64;
    let dy = (a.row - b.row).unsigned_abs() as f64;
    dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
}

fn step_cost(from: GridCoord, to: GridCoord) -> f64 {
    if from.col != to.col && from.row != to.row {
        SQRT_2
    } else {
        1.0
    }
}

/// Open-set entry ordered so the max-heap pops the lowest f score first,
/// earliest pushed on ties.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    seq: u64,
    coord: GridCoord,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a cheapest path from `start` to `goal`.
///
/// Cardinal steps cost 1 and diagonal steps cost √2.
pub fn astar(graph: &GridGraph, start: GridCoord, goal: GridCoord) -> PathResult {
    if !graph.is_walkable(start.col, start.row) || !graph.is_walkable(goal.col, goal.row) {
        return PathResult::not_found();
    }
    if start == goal {
        return PathResult {
            path: vec![start],
            found: true,
            cost: 0.0,
        };
    }

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<GridCoord, f64> = HashMap::new();
    let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0.0);
    open.push(OpenNode {
        f: heuristic(start, goal),
        seq,
        coord: start,
    });

    while let Some(OpenNode { f, coord: current, .. }) = open.pop() {
        let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);
        // Stale entry superseded by a cheaper push
        if f > current_g + heuristic(current, goal) {
            continue;
        }
        if current == goal {
            let path = reconstruct_path(&came_from, goal);
            tracing::trace!("A* found path of {} cells, cost {}", path.len(), current_g);
            return PathResult {
                path,
                found: true,
                cost: current_g,
            };
        }

        for neighbor in graph.neighbors(current.col, current.row) {
            let tentative = current_g + step_cost(current, neighbor);
            if tentative < g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                seq += 1;
                open.push(OpenNode {
                    f: tentative + heuristic(neighbor, goal),
                    seq,
                    coord: neighbor,
                });
            }
        }
    }

    PathResult::not_found()
}

fn reconstruct_path(came_from: &HashMap<GridCoord, GridCoord>, goal: GridCoord) -> Vec<GridCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c(col: i32, row: i32) -> GridCoord {
        GridCoord::new(col, row)
    }

    fn assert_contiguous(path: &[GridCoord]) {
        for pair in path.windows(2) {
            let dc = (pair[0].col - pair[1].col).abs();
            let dr = (pair[0].row - pair[1].row).abs();
            assert!(dc <= 1 && dr <= 1 && (dc + dr) > 0, "gap in {path:?}");
        }
    }

    #[test]
    fn test_straight_line_four_way() {
        let graph = GridGraph::new(5, 5, false);
        let result = astar(&graph, c(0, 0), c(4, 0));
        assert!(result.found);
        assert_eq!(result.path.len(), 5);
        assert_eq!(result.cost, 4.0);
        assert_eq!(result.path.first(), Some(&c(0, 0)));
        assert_eq!(result.path.last(), Some(&c(4, 0)));
    }

    #[test]
    fn test_wall_blocks_path() {
        let mut graph = GridGraph::new(5, 5, false);
        for row in 0..5 {
            graph.set_walkable(2, row, false);
        }
        assert_eq!(astar(&graph, c(0, 0), c(4, 0)), PathResult::not_found());
    }

    #[test]
    fn test_pure_diagonal() {
        let graph = GridGraph::new(5, 5, true);
        let result = astar(&graph, c(0, 0), c(4, 4));
        assert!(result.found);
        assert_eq!(result.path, vec![c(0, 0), c(1, 1), c(2, 2), c(3, 3), c(4, 4)]);
        assert!((result.cost - 4.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = GridGraph::new(3, 3, true);
        let result = astar(&graph, c(1, 1), c(1, 1));
        assert_eq!(
            result,
            PathResult {
                path: vec![c(1, 1)],
                found: true,
                cost: 0.0
            }
        );
    }

    #[test]
    fn test_unwalkable_endpoints() {
        let mut graph = GridGraph::new(3, 3, true);
        graph.set_walkable(2, 2, false);
        assert!(!astar(&graph, c(0, 0), c(2, 2)).found);
        assert!(!astar(&graph, c(2, 2), c(0, 0)).found);
        assert!(!astar(&graph, c(-1, 0), c(0, 0)).found);
    }

    #[test]
    fn test_detours_around_obstacle() {
        // Wall in column 2 with a gap at the bottom row
        let mut graph = GridGraph::new(5, 5, false);
        for row in 0..4 {
            graph.set_walkable(2, row, false);
        }
        let result = astar(&graph, c(0, 0), c(4, 0));
        assert!(result.found);
        assert_eq!(result.cost, 12.0);
        assert_eq!(result.path.len(), 13);
        assert!(result.path.contains(&c(2, 4)));
        assert_contiguous(&result.path);
    }

    #[test]
    fn test_mixed_moves_cost() {
        let graph = GridGraph::new(6, 3, true);
        let result = astar(&graph, c(0, 0), c(5, 2));
        assert!(result.found);
        assert!((result.cost - (3.0 + 2.0 * SQRT_2)).abs() < 1e-9);
        assert_eq!(result.path.len(), 6);
        assert_contiguous(&result.path);
    }
}
