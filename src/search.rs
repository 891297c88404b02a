use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use crate::grid::{Dir, Grid, Pos, Tile};

/// BFS reachability over path cells only. FIFO frontier, each cell visited
/// at most once, true as soon as the goal is dequeued.
pub fn is_reachable(grid: &Grid, start: Pos, goal: Pos) -> bool {
    let n = grid.size();
    let mut seen = vec![vec![false; n]; n];
    let mut queue = VecDeque::new();
    seen[start.y][start.x] = true;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        if pos == goal {
            return true;
        }
        for dir in Dir::ALL {
            let Some(next) = grid.neighbor(pos, dir) else {
                continue;
            };
            if seen[next.y][next.x] || grid.get(next) != Tile::Path {
                continue;
            }
            seen[next.y][next.x] = true;
            queue.push_back(next);
        }
    }
    false
}

/// A* over the full grid graph, deliberately ignoring wall state: the result
/// is carved into the maze during repair, not walked on the existing paths.
/// Manhattan heuristic, unit step cost. Ties on estimated total cost break by
/// insertion order so repeated calls pick the same path.
pub fn find_path(grid: &Grid, start: Pos, goal: Pos) -> Vec<Pos> {
    if start == goal {
        return vec![start];
    }

    let n = grid.size();
    let mut best = vec![vec![usize::MAX; n]; n];
    let mut parent: HashMap<Pos, Pos> = HashMap::new();
    let mut open: BinaryHeap<(Reverse<(usize, usize)>, Pos)> = BinaryHeap::new();
    let mut seq = 0usize;

    best[start.y][start.x] = 0;
    open.push((Reverse((manhattan(start, goal), seq)), start));

    while let Some((_, pos)) = open.pop() {
        if pos == goal {
            return reconstruct(&parent, start, goal);
        }
        let cost = best[pos.y][pos.x].saturating_add(1);
        for dir in Dir::ALL {
            let Some(next) = grid.neighbor(pos, dir) else {
                continue;
            };
            if cost < best[next.y][next.x] {
                best[next.y][next.x] = cost;
                parent.insert(next, pos);
                seq += 1;
                open.push((Reverse((cost + manhattan(next, goal), seq)), next));
            }
        }
    }
    Vec::new()
}

pub fn manhattan(a: Pos, b: Pos) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

fn reconstruct(parent: &HashMap<Pos, Pos>, start: Pos, goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parent.get(&current) {
            Some(prev) => {
                path.push(*prev);
                current = *prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Pos, Tile};

    fn corridor_grid() -> Grid {
        // Single open row at y=1 from x=1 to x=5.
        let mut grid = Grid::filled(8, Tile::Wall);
        for x in 1..=5 {
            grid.set(Pos::new(x, 1), Tile::Path);
        }
        grid
    }

    #[test]
    fn bfs_follows_open_corridor() {
        let grid = corridor_grid();
        assert!(is_reachable(&grid, Pos::new(1, 1), Pos::new(5, 1)));
    }

    #[test]
    fn bfs_stops_at_walls() {
        let mut grid = corridor_grid();
        grid.set(Pos::new(3, 1), Tile::Wall);
        assert!(!is_reachable(&grid, Pos::new(1, 1), Pos::new(5, 1)));
        // The far side is its own component.
        assert!(is_reachable(&grid, Pos::new(4, 1), Pos::new(5, 1)));
    }

    #[test]
    fn bfs_is_deterministic() {
        let grid = corridor_grid();
        for _ in 0..5 {
            assert!(is_reachable(&grid, Pos::new(1, 1), Pos::new(5, 1)));
            assert!(!is_reachable(&grid, Pos::new(1, 1), Pos::new(6, 6)));
        }
    }

    #[test]
    fn astar_with_equal_endpoints_returns_single_cell() {
        let grid = Grid::filled(12, Tile::Wall);
        let start = Pos::new(4, 7);
        assert_eq!(find_path(&grid, start, start), vec![start]);
    }

    #[test]
    fn astar_path_is_valid_and_optimal_on_open_grid() {
        // All-wall grid: A* searches the full grid graph regardless of tiles.
        let grid = Grid::filled(12, Tile::Wall);
        let start = Pos::new(1, 1);
        let goal = Pos::new(10, 10);
        let path = find_path(&grid, start, goal);

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), manhattan(start, goal) + 1);
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1);
        }
        let mut seen = std::collections::HashSet::new();
        for pos in &path {
            assert!(seen.insert(*pos), "cell repeated: {pos:?}");
        }
    }

    #[test]
    fn astar_is_deterministic() {
        let grid = Grid::filled(12, Tile::Path);
        let start = Pos::new(2, 9);
        let goal = Pos::new(10, 3);
        let first = find_path(&grid, start, goal);
        for _ in 0..5 {
            assert_eq!(find_path(&grid, start, goal), first);
        }
    }

    #[test]
    fn astar_handles_goal_left_and_above_start() {
        let grid = Grid::filled(12, Tile::Wall);
        let start = Pos::new(10, 10);
        let goal = Pos::new(1, 1);
        let path = find_path(&grid, start, goal);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(path.len(), manhattan(start, goal) + 1);
    }
}
