use rand::Rng;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Food,
    Snake,
}

#[derive(Debug, PartialEq, Eq)]
pub enum GridError {
    EmptyDimensions { width: u16, height: u16 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::EmptyDimensions { width, height } => {
                write!(f, "grid must be at least 1x1, got {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Row-major playing field. Dimensions are fixed once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        Ok(Grid {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn center(&self) -> Pos {
        Pos::new(i32::from(self.width / 2), i32::from(self.height / 2))
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < i32::from(self.width) && pos.y < i32::from(self.height)
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Callers classify a move before placing, so `pos` is always on the grid.
    pub fn place(&mut self, pos: Pos, cell: Cell) {
        debug_assert!(self.contains(pos), "placing {:?} outside the grid", pos);
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Row by row, left to right.
    pub fn cells(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (Pos::new((i % width) as i32, (i / width) as i32), cell))
    }

    /// Drops food on a uniformly random empty cell, or returns `None` when the
    /// board has no room left.
    pub fn spawn_food(&mut self, rng: &mut impl Rng) -> Option<Pos> {
        if self.count(Cell::Empty) == 0 {
            return None;
        }
        loop {
            let pos = Pos::new(
                rng.gen_range(0..i32::from(self.width)),
                rng.gen_range(0..i32::from(self.height)),
            );
            if self.get(pos) == Some(Cell::Empty) {
                self.place(pos, Cell::Food);
                return Some(pos);
            }
        }
    }
}
