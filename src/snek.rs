use crate::grid::Pos;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosDelta {
    pub x: i32,
    pub y: i32,
}

impl From<Direction> for PosDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => PosDelta { x: 0, y: -1 },
            Direction::Down => PosDelta { x: 0, y: 1 },
            Direction::Left => PosDelta { x: -1, y: 0 },
            Direction::Right => PosDelta { x: 1, y: 0 },
        }
    }
}

impl Pos {
    /// Unwrapped: the result may fall off the grid, which is the classifier's call.
    pub fn offset(&self, delta: PosDelta) -> Pos {
        Pos::new(self.x + delta.x, self.y + delta.y)
    }
}

/// Body runs head (front) to tail (back). Never empty.
#[derive(Clone, Debug)]
pub struct Snek {
    body: VecDeque<Pos>,
    direction: Direction,
}

impl Snek {
    pub fn new(start: Pos, direction: Direction) -> Self {
        Snek {
            body: VecDeque::from([start]),
            direction,
        }
    }

    pub fn head(&self) -> Pos {
        self.body[0]
    }

    #[cfg(test)]
    pub fn tail(&self) -> Pos {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[cfg(test)]
    pub fn segments(&self) -> impl Iterator<Item = &Pos> {
        self.body.iter()
    }

    /// Turning straight back onto the neck is ignored.
    pub fn change_direction(&mut self, new_direction: Direction) {
        if new_direction.opposite() != self.direction {
            self.direction = new_direction;
        }
    }

    pub fn next_head(&self) -> Pos {
        self.head().offset(self.direction.into())
    }

    pub fn push_head(&mut self, pos: Pos) {
        self.body.push_front(pos);
    }

    /// Keeps at least one segment; returns the removed tail.
    pub fn pop_tail(&mut self) -> Option<Pos> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }
}
