#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Wall,
    Path,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    // Fixed scan order; searches rely on this for determinism.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Square wall/path grid. Indexing out of bounds is a caller bug and panics.
#[derive(Clone)]
pub struct Grid {
    size: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn filled(size: usize, tile: Tile) -> Self {
        Self {
            size,
            tiles: vec![vec![tile; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Pos) -> Tile {
        self.tiles[pos.y][pos.x]
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.tiles[pos.y][pos.x] = tile;
    }

    pub fn is_path(&self, pos: Pos) -> bool {
        self.get(pos) == Tile::Path
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// One orthogonal step, or None if it leaves the grid.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if self.in_bounds(nx, ny) {
            Some(Pos::new(nx as usize, ny as usize))
        } else {
            None
        }
    }
}
