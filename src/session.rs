use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Dir, Grid, Pos, Tile};
use crate::maze;

pub const DEFAULT_GRID_SIZE: usize = 12;
pub const START: Pos = Pos { x: 1, y: 1 };

/// Outcome of one move request, surfaced to the presentation layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Accepted,
    Rejected,
    GoalReached,
}

/// One round of the game: the frozen maze plus the mutable player state.
/// The grid never changes between `new_game` calls.
pub struct Session {
    grid: Grid,
    goal: Pos,
    player: Pos,
    moves: u32,
    won: bool,
}

impl Session {
    pub fn new(rng: &mut impl Rng, size: usize) -> Self {
        let goal = roll_goal(rng, size);
        let grid = maze::generate(rng, size, START, goal);
        Self {
            grid,
            goal,
            player: START,
            moves: 0,
            won: false,
        }
    }

    /// Re-roll the goal, rebuild the maze, put the player back at start.
    pub fn new_game(&mut self, rng: &mut impl Rng) {
        let size = self.grid.size();
        self.goal = roll_goal(rng, size);
        self.grid = maze::generate(rng, size, START, self.goal);
        self.player = START;
        self.moves = 0;
        self.won = false;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn won(&self) -> bool {
        self.won
    }

    /// In-bounds AND a path cell. Signed so callers can probe one step past
    /// the border without wrapping.
    pub fn is_valid_move(&self, x: isize, y: isize) -> bool {
        self.grid.in_bounds(x, y) && self.grid.get(Pos::new(x as usize, y as usize)) == Tile::Path
    }

    /// Apply one directional move request. Rejected moves leave all state
    /// untouched; accepted moves bump the counter and may win the round.
    pub fn try_move(&mut self, dir: Dir) -> MoveOutcome {
        if self.won {
            return MoveOutcome::Rejected;
        }
        let (dx, dy) = dir.delta();
        let nx = self.player.x as isize + dx;
        let ny = self.player.y as isize + dy;
        if !self.is_valid_move(nx, ny) {
            return MoveOutcome::Rejected;
        }
        self.player = Pos::new(nx as usize, ny as usize);
        self.moves += 1;
        if self.player == self.goal {
            self.won = true;
            MoveOutcome::GoalReached
        } else {
            MoveOutcome::Accepted
        }
    }
}

fn roll_goal(rng: &mut impl Rng, size: usize) -> Pos {
    let candidates = [
        Pos::new(size - 2, size - 2),
        Pos::new(size - 2, 1),
        Pos::new(1, size - 2),
        Pos::new(size / 2, size - 2),
        Pos::new(size - 2, size / 2),
    ];
    *candidates.choose(rng).unwrap()
}
