use crate::grid::{Cell, Grid, Pos};

/// What stepping onto a cell means, decided before anything moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    OutOfBounds,
    SelfCollision,
    FoodEaten,
    Advance,
}

impl Move {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Move::OutOfBounds | Move::SelfCollision)
    }
}

pub fn classify(grid: &Grid, candidate: Pos) -> Move {
    // `get` is bounds-checked, so walls fall out of the `None` arm.
    match grid.get(candidate) {
        None => Move::OutOfBounds,
        Some(Cell::Snake) => Move::SelfCollision,
        Some(Cell::Food) => Move::FoodEaten,
        Some(Cell::Empty) => Move::Advance,
    }
}
