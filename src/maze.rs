use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Dir, Grid, Pos, Tile};
use crate::search;

const MIN_EXTRA_OPENINGS: usize = 2;
const MAX_EXTRA_OPENINGS: usize = 4;
const MIN_VARIETY_SEGMENTS: usize = 4;
const MAX_VARIETY_SEGMENTS: usize = 11;
const VARIETY_SEGMENT_LEN: usize = 3;

/// Build a fresh maze: carve from all-wall, force start and goal open, then
/// repair until the goal is reachable. The returned grid always satisfies
/// `search::is_reachable(grid, start, goal)`.
pub fn generate(rng: &mut impl Rng, size: usize, start: Pos, goal: Pos) -> Grid {
    let mut grid = Grid::filled(size, Tile::Wall);
    carve_backtracking(&mut grid, rng, start);
    carve_extra_openings(&mut grid, rng);
    grid.set(start, Tile::Path);
    grid.set(goal, Tile::Path);
    ensure_reachable(&mut grid, rng, start, goal);
    grid
}

/// Randomized depth-first carving over the odd lattice (step 2), with an
/// explicit backtracking stack. Produces a spanning tree over the lattice
/// cells reachable from start; cells off the lattice (even rows/columns near
/// the far border) are left to the repair phase.
fn carve_backtracking(grid: &mut Grid, rng: &mut impl Rng, start: Pos) {
    let n = grid.size();
    let mut visited = vec![vec![false; n]; n];
    let mut stack: Vec<Pos> = Vec::new();
    let mut current = start;
    grid.set(current, Tile::Path);
    visited[current.y][current.x] = true;

    loop {
        let mut candidates: Vec<(Pos, Pos)> = Vec::new();
        for dir in Dir::ALL {
            let (dx, dy) = dir.delta();
            let nx = current.x as isize + dx * 2;
            let ny = current.y as isize + dy * 2;
            // Lattice cells stay strictly inside the outer border.
            if nx <= 0 || ny <= 0 || nx >= (n - 1) as isize || ny >= (n - 1) as isize {
                continue;
            }
            let next = Pos::new(nx as usize, ny as usize);
            if visited[next.y][next.x] {
                continue;
            }
            let wall = Pos::new(
                (current.x as isize + dx) as usize,
                (current.y as isize + dy) as usize,
            );
            candidates.push((wall, next));
        }

        if let Some(&(wall, next)) = candidates.choose(rng) {
            grid.set(wall, Tile::Path);
            grid.set(next, Tile::Path);
            visited[next.y][next.x] = true;
            stack.push(current);
            current = next;
        } else if let Some(prev) = stack.pop() {
            current = prev;
        } else {
            break;
        }
    }
}

/// Open a few walls that already touch at least two path cells. Such a carve
/// can only merge connected regions, never split one, so the spanning tree's
/// connectivity survives while dead-end corridors gain loops.
fn carve_extra_openings(grid: &mut Grid, rng: &mut impl Rng) {
    let wanted = rng.gen_range(MIN_EXTRA_OPENINGS..=MAX_EXTRA_OPENINGS);
    for _ in 0..wanted {
        let candidates = opening_candidates(grid);
        if let Some(&pos) = candidates.choose(rng) {
            grid.set(pos, Tile::Path);
        }
    }
}

fn opening_candidates(grid: &Grid) -> Vec<Pos> {
    let n = grid.size();
    let mut candidates = Vec::new();
    for y in 1..n - 1 {
        for x in 1..n - 1 {
            let pos = Pos::new(x, y);
            if grid.get(pos) == Tile::Wall && path_neighbors(grid, pos) >= 2 {
                candidates.push(pos);
            }
        }
    }
    candidates
}

fn path_neighbors(grid: &Grid, pos: Pos) -> usize {
    Dir::ALL
        .iter()
        .filter(|dir| {
            grid.neighbor(pos, **dir)
                .is_some_and(|next| grid.get(next) == Tile::Path)
        })
        .count()
}

/// Connectivity guarantor. Post-condition: goal is reachable from start.
pub fn ensure_reachable(grid: &mut Grid, rng: &mut impl Rng, start: Pos, goal: Pos) {
    if !search::is_reachable(grid, start, goal) {
        let path = search::find_path(grid, start, goal);
        if path.is_empty() {
            carve_direct_path(grid, start, goal);
        } else {
            for pos in path {
                grid.set(pos, Tile::Path);
            }
        }
    }

    inject_variety_paths(grid, rng);

    // Injection only carves, so this should not fire; absolute fallback.
    if !search::is_reachable(grid, start, goal) {
        carve_direct_path(grid, start, goal);
    }
}

/// L-shaped forced route: walk x toward the goal column, then y toward the
/// goal row, carving every cell on the way.
fn carve_direct_path(grid: &mut Grid, start: Pos, goal: Pos) {
    let mut cur = start;
    grid.set(cur, Tile::Path);
    while cur.x != goal.x {
        cur.x = if goal.x > cur.x { cur.x + 1 } else { cur.x - 1 };
        grid.set(cur, Tile::Path);
    }
    while cur.y != goal.y {
        cur.y = if goal.y > cur.y { cur.y + 1 } else { cur.y - 1 };
        grid.set(cur, Tile::Path);
    }
}

/// Cosmetic short segments near the carved area. Each segment must start on
/// or next to an existing path cell so it extends the maze instead of adding
/// isolated clutter.
fn inject_variety_paths(grid: &mut Grid, rng: &mut impl Rng) {
    let n = grid.size();
    let segments = rng.gen_range(MIN_VARIETY_SEGMENTS..=MAX_VARIETY_SEGMENTS);
    for _ in 0..segments {
        let anchor = Pos::new(rng.gen_range(1..n - 1), rng.gen_range(1..n - 1));
        if grid.get(anchor) != Tile::Path && path_neighbors(grid, anchor) == 0 {
            continue;
        }
        let horizontal = rng.gen_bool(0.5);
        for step in 0..VARIETY_SEGMENT_LEN {
            let (x, y) = if horizontal {
                (anchor.x + step, anchor.y)
            } else {
                (anchor.x, anchor.y + step)
            };
            if x >= n - 1 || y >= n - 1 {
                break;
            }
            grid.set(Pos::new(x, y), Tile::Path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Pos, Tile};
    use crate::search;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SIZE: usize = 12;
    const START: Pos = Pos { x: 1, y: 1 };

    fn goal_candidates() -> [Pos; 5] {
        [
            Pos::new(SIZE - 2, SIZE - 2),
            Pos::new(SIZE - 2, 1),
            Pos::new(1, SIZE - 2),
            Pos::new(SIZE / 2, SIZE - 2),
            Pos::new(SIZE - 2, SIZE / 2),
        ]
    }

    #[test]
    fn every_generated_maze_is_winnable() {
        for seed in 0..40 {
            for goal in goal_candidates() {
                let mut rng = StdRng::seed_from_u64(seed);
                let grid = generate(&mut rng, SIZE, START, goal);
                assert!(grid.is_path(START));
                assert!(grid.is_path(goal));
                assert!(
                    search::is_reachable(&grid, START, goal),
                    "goal {goal:?} unreachable with seed {seed}"
                );
            }
        }
    }

    #[test]
    fn generated_maze_keeps_border_walled() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = generate(&mut rng, SIZE, START, Pos::new(SIZE - 2, SIZE - 2));
        for i in 0..SIZE {
            assert_eq!(grid.get(Pos::new(i, 0)), Tile::Wall);
            assert_eq!(grid.get(Pos::new(0, i)), Tile::Wall);
            assert_eq!(grid.get(Pos::new(i, SIZE - 1)), Tile::Wall);
            assert_eq!(grid.get(Pos::new(SIZE - 1, i)), Tile::Wall);
        }
    }

    #[test]
    fn guarantor_repairs_fully_walled_grid() {
        // Generator stub: nothing carved between start and goal at all.
        let mut grid = Grid::filled(SIZE, Tile::Wall);
        let goal = Pos::new(SIZE - 2, SIZE - 2);
        grid.set(START, Tile::Path);
        grid.set(goal, Tile::Path);
        assert!(!search::is_reachable(&grid, START, goal));

        let mut rng = StdRng::seed_from_u64(3);
        ensure_reachable(&mut grid, &mut rng, START, goal);
        assert!(search::is_reachable(&grid, START, goal));
    }

    #[test]
    fn direct_path_carves_toward_any_corner() {
        for goal in [Pos::new(10, 10), Pos::new(1, 10), Pos::new(10, 1)] {
            let mut grid = Grid::filled(SIZE, Tile::Wall);
            carve_direct_path(&mut grid, Pos::new(5, 5), goal);
            assert!(search::is_reachable(&grid, Pos::new(5, 5), goal));
        }
    }

    #[test]
    fn extra_openings_touch_two_paths() {
        let mut grid = Grid::filled(SIZE, Tile::Wall);
        // Two parallel corridors separated by one wall column.
        for y in 1..SIZE - 1 {
            grid.set(Pos::new(3, y), Tile::Path);
            grid.set(Pos::new(5, y), Tile::Path);
        }
        let candidates = opening_candidates(&grid);
        assert!(!candidates.is_empty());
        for pos in candidates {
            assert_eq!(pos.x, 4);
        }
    }

    #[test]
    fn variety_injection_never_touches_border() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::filled(SIZE, Tile::Wall);
            grid.set(Pos::new(5, 5), Tile::Path);
            inject_variety_paths(&mut grid, &mut rng);
            for i in 0..SIZE {
                assert_eq!(grid.get(Pos::new(i, 0)), Tile::Wall);
                assert_eq!(grid.get(Pos::new(0, i)), Tile::Wall);
                assert_eq!(grid.get(Pos::new(i, SIZE - 1)), Tile::Wall);
                assert_eq!(grid.get(Pos::new(SIZE - 1, i)), Tile::Wall);
            }
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let goal = Pos::new(SIZE - 2, SIZE - 2);
        let mut rng_a = StdRng::seed_from_u64(11);
        let mut rng_b = StdRng::seed_from_u64(11);
        let a = generate(&mut rng_a, SIZE, START, goal);
        let b = generate(&mut rng_b, SIZE, START, goal);
        for y in 0..SIZE {
            for x in 0..SIZE {
                assert_eq!(a.get(Pos::new(x, y)), b.get(Pos::new(x, y)));
            }
        }
    }
}
