use rand::Rng;
use std::fmt;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Every direction, in `Up, Down, Left, Right` order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

type Tile = u64;

const MILESTONE_TILE: Tile = 2048;
// Merging two of these produces the milestone tile.
const MILESTONE_MERGE: Tile = MILESTONE_TILE / 2;

/// Largest accepted grid side.
pub const MAX_SIZE: usize = 256;
// Digits of the largest tile a `u64` cell holds, 2^63.
const MAX_CELL_WIDTH: usize = 19;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid grid size {size}: size must be between 2 and {MAX_SIZE}")]
    InvalidSize { size: usize },
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    #[error("no empty cell left to spawn a tile into")]
    NoEmptyCell,
}

/// Square N x N 2048 grid stored row-major, 0 meaning an empty cell.
///
/// The tile count and the milestone flag are maintained incrementally by
/// [`Grid::spawn_random`] and the directional moves; only [`Grid::set_grid`]
/// derives them from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Tile>,
    tiles: usize,
    reached_milestone: bool,
    cell_width: usize,
}

/// Indexed view over one row or column, position 0 being the edge tiles slide towards.
#[derive(Clone, Copy)]
struct Line {
    dir: Move,
    index: usize,
    size: usize,
}

impl Line {
    #[inline(always)]
    fn cell(self, pos: usize) -> usize {
        let far = self.size - 1;
        let (row, col) = match self.dir {
            Move::Left => (self.index, pos),
            Move::Right => (self.index, far - pos),
            Move::Up => (pos, self.index),
            Move::Down => (far - pos, self.index),
        };
        row * self.size + col
    }
}

impl Grid {
    /// Create an empty `size` x `size` grid.
    ///
    /// ```
    /// use slide_2048::engine::{Grid, GridError};
    /// let grid = Grid::new(4).unwrap();
    /// assert_eq!(grid.tile_count(), 0);
    /// assert_eq!(Grid::new(1), Err(GridError::InvalidSize { size: 1 }));
    /// ```
    pub fn new(size: usize) -> Result<Self, GridError> {
        let mut grid = Grid {
            size: 0,
            cells: Vec::new(),
            tiles: 0,
            reached_milestone: false,
            cell_width: 0,
        };
        grid.set_size(size)?;
        Ok(grid)
    }

    /// Build a grid from explicit rows; see [`Grid::set_grid`].
    ///
    /// ```
    /// use slide_2048::engine::Grid;
    /// let grid = Grid::from_rows(vec![vec![2, 0], vec![0, 2048]]).unwrap();
    /// assert_eq!(grid.tile_count(), 2);
    /// assert!(grid.reached_milestone());
    /// ```
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let mut grid = Grid::new(2)?;
        grid.set_grid(rows)?;
        Ok(grid)
    }

    /// Reset to an empty `size` x `size` grid. The milestone flag is kept.
    pub fn set_size(&mut self, size: usize) -> Result<(), GridError> {
        check_size(size)?;
        self.size = size;
        self.cells = vec![0; size * size];
        self.tiles = 0;
        self.cell_width = cell_width_for(size);
        Ok(())
    }

    /// Replace the whole matrix, adopting its dimension.
    ///
    /// Rejects empty or non-square matrices and tiles that are neither 0 nor a
    /// power of two >= 2. The tile count is recounted; the milestone flag is
    /// raised if any tile is already 2048 or more.
    pub fn set_grid(&mut self, rows: Vec<Vec<Tile>>) -> Result<(), GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::InvalidGrid("matrix has no rows".to_string()));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(GridError::InvalidGrid(format!(
                "row {idx} has {} cells but the matrix has {size} rows",
                row.len()
            )));
        }
        check_size(size)?;
        if let Some(bad) = rows.iter().flatten().find(|&&tile| !is_valid_tile(tile)) {
            return Err(GridError::InvalidGrid(format!("tile {bad} is not a power of two >= 2")));
        }

        let cells: Vec<Tile> = rows.into_iter().flatten().collect();
        self.tiles = cells.iter().filter(|&&tile| tile != 0).count();
        self.reached_milestone |= cells.iter().any(|&tile| tile >= MILESTONE_TILE);
        self.cells = cells;
        self.size = size;
        self.cell_width = cell_width_for(size);
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    /// Number of non-empty cells.
    #[inline]
    pub fn tile_count(&self) -> usize { self.tiles }

    /// Number of empty cells.
    #[inline]
    pub fn empty_cells(&self) -> usize { self.cells.len() - self.tiles }

    #[inline]
    pub fn has_empty_cell(&self) -> bool { self.empty_cells() > 0 }

    /// Printed width of one cell: the digits of `2^(N*N + 1)`, at most those of `2^63`.
    #[inline]
    pub fn cell_width(&self) -> usize { self.cell_width }

    /// True once a 2048 tile has appeared. Never resets.
    #[inline]
    pub fn reached_milestone(&self) -> bool { self.reached_milestone }

    /// Tile at `(row, col)`, or `None` when out of bounds.
    pub fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// The highest tile on the grid (0 if empty).
    pub fn max_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Borrowed rows, top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<'_, Tile> {
        self.cells.chunks(self.size)
    }

    /// Owned copy of the matrix. Editing it does not touch the grid.
    pub fn grid(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Place a 2 or a 4 (even odds) in a uniformly chosen empty cell.
    ///
    /// Fails with [`GridError::NoEmptyCell`] on a full grid instead of
    /// searching forever.
    ///
    /// ```
    /// use slide_2048::engine::Grid;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let mut grid = Grid::new(4).unwrap();
    /// grid.spawn_random(&mut rng).unwrap();
    /// grid.spawn_random(&mut rng).unwrap();
    /// assert_eq!(grid.tile_count(), 2);
    /// ```
    pub fn spawn_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GridError> {
        if !self.has_empty_cell() {
            return Err(GridError::NoEmptyCell);
        }
        let value: Tile = (rng.gen_range(0..2) + 1) * 2;

        let len = self.cells.len();
        let mut index = rng.gen_range(0..len);
        while self.cells[index] != 0 {
            index = rng.gen_range(0..len);
        }

        self.cells[index] = value;
        self.tiles += 1;
        log::trace!("spawned {value} at ({}, {})", index / self.size, index % self.size);
        Ok(())
    }

    /// Convenience: like `spawn_random` but uses thread-local RNG.
    pub fn spawn_random_thread(&mut self) -> Result<(), GridError> {
        let mut rng = rand::thread_rng();
        self.spawn_random(&mut rng)
    }

    /// True if the grid is full and no two neighbouring cells are equal,
    /// so no move can change it.
    pub fn is_game_over(&self) -> bool {
        if self.has_empty_cell() {
            return false;
        }
        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let tile = self.cells[row * n + col];
                if row > 0 && merge(tile, self.cells[(row - 1) * n + col]).is_some() {
                    return false;
                }
                if col > 0 && merge(tile, self.cells[row * n + col - 1]).is_some() {
                    return false;
                }
            }
        }
        true
    }

    /// Slide and merge in `dir`. Returns whether anything changed.
    ///
    /// ```
    /// use slide_2048::engine::{Grid, Move};
    /// let mut grid = Grid::from_rows(vec![vec![2, 2], vec![0, 4]]).unwrap();
    /// assert!(grid.apply(Move::Left));
    /// assert_eq!(grid.grid(), vec![vec![4, 0], vec![4, 0]]);
    /// assert!(!grid.apply(Move::Left));
    /// ```
    #[inline]
    pub fn apply(&mut self, dir: Move) -> bool {
        self.slide(dir)
    }

    pub fn move_up(&mut self) -> bool { self.slide(Move::Up) }

    pub fn move_down(&mut self) -> bool { self.slide(Move::Down) }

    pub fn move_left(&mut self) -> bool { self.slide(Move::Left) }

    pub fn move_right(&mut self) -> bool { self.slide(Move::Right) }

    fn slide(&mut self, dir: Move) -> bool {
        let mut moved = false;
        for index in 0..self.size {
            let line = Line { dir, index, size: self.size };
            // `base` is the next free slot; a merge lands on the slot before it.
            let mut base = 0;
            let mut previous: Tile = 0;

            for pos in 0..self.size {
                let square = self.cells[line.cell(pos)];
                if square == 0 {
                    continue;
                }

                if let Some(merged) = merge(square, previous) {
                    self.cells[line.cell(base - 1)] = merged;
                    self.cells[line.cell(pos)] = 0;
                    previous = 0;
                    moved = true;
                    self.tiles -= 1;
                    if square == MILESTONE_MERGE && !self.reached_milestone {
                        self.reached_milestone = true;
                        log::debug!("milestone tile {MILESTONE_TILE} reached");
                    }
                    continue;
                }

                if pos != base {
                    self.cells[line.cell(base)] = square;
                    self.cells[line.cell(pos)] = 0;
                    moved = true;
                }
                previous = square;
                base += 1;
            }
        }
        log::trace!("{dir:?}: moved={moved}, tiles={}", self.tiles);
        moved
    }

    /// Lazily render the grid as bordered text lines, blanks for empty cells.
    ///
    /// ```
    /// use slide_2048::engine::Grid;
    /// let grid = Grid::from_rows(vec![vec![2, 0], vec![0, 16]]).unwrap();
    /// let lines: Vec<String> = grid.render().collect();
    /// assert_eq!(lines, ["-------", "| 2|  |", "-------", "|  |16|", "-------"]);
    /// ```
    pub fn render(&self) -> impl Iterator<Item = String> + '_ {
        let separator = "-".repeat(self.size * (self.cell_width + 1) + 1);
        std::iter::once(separator.clone())
            .chain(self.rows().flat_map(move |row| [self.render_row(row), separator.clone()]))
    }

    fn render_row(&self, row: &[Tile]) -> String {
        let width = self.cell_width;
        let mut line = String::with_capacity(row.len() * (width + 1) + 1);
        for &tile in row {
            let cell = if tile == 0 { String::new() } else { tile.to_string() };
            line.push('|');
            line.push_str(&format!("{cell:>width$}"));
        }
        line.push('|');
        line
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn check_size(size: usize) -> Result<(), GridError> {
    if !(2..=MAX_SIZE).contains(&size) {
        return Err(GridError::InvalidSize { size });
    }
    Ok(())
}

// Equal tiles combine unless the result would overflow a cell.
#[inline]
fn merge(a: Tile, b: Tile) -> Option<Tile> {
    if a == b { a.checked_mul(2) } else { None }
}

#[inline]
fn is_valid_tile(tile: Tile) -> bool {
    tile == 0 || (tile >= 2 && tile.is_power_of_two())
}

// Digits of the largest tile an N x N grid can theoretically hold, 2^(N*N + 1),
// capped at what a cell can store.
fn cell_width_for(size: usize) -> usize {
    let exponent = (size * size + 1) as f64;
    let width = (exponent * std::f64::consts::LOG10_2).floor() as usize + 1;
    width.min(MAX_CELL_WIDTH)
}
