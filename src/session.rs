use crate::collision::{classify, Move};
use crate::config::GameConfig;
use crate::grid::{Cell, Grid, GridError, Pos};
use crate::snek::{Direction, Snek};
use log::debug;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Ongoing,
    Nommed(u32),
    /// Hit a wall or itself.
    Collision(Move),
    /// Ate the last free cell; nowhere left to put food.
    BoardFull,
}

impl StepResult {
    pub fn is_over(&self) -> bool {
        matches!(self, StepResult::Collision(_) | StepResult::BoardFull)
    }
}

/// One round's worth of state: the board, the snake on it and the score.
#[derive(Clone, Debug)]
pub struct GameSession {
    grid: Grid,
    snek: Snek,
    score: u32,
    food_reward: u32,
}

impl GameSession {
    pub fn new(
        config: &GameConfig,
        direction: Direction,
        rng: &mut impl Rng,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(config.grid_width, config.grid_height)?;
        let start = grid.center();
        grid.place(start, Cell::Snake);
        grid.spawn_food(rng);

        Ok(GameSession {
            grid,
            snek: Snek::new(start, direction),
            score: 0,
            food_reward: config.food_reward,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snek(&self) -> &Snek {
        &self.snek
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn change_direction(&mut self, direction: Direction) {
        self.snek.change_direction(direction);
    }

    /// Moves the snake one cell. Fatal moves leave everything untouched.
    pub fn tick(&mut self, rng: &mut impl Rng) -> StepResult {
        let next = self.snek.next_head();
        let step = classify(&self.grid, next);

        match step {
            Move::OutOfBounds | Move::SelfCollision => {
                debug!("Collision at {:?}: {:?}", next, step);
                StepResult::Collision(step)
            }
            Move::FoodEaten => {
                self.push_head(next);
                self.score += self.food_reward;
                debug!("Ate food at {:?}, score {}", next, self.score);
                match self.grid.spawn_food(rng) {
                    Some(_) => StepResult::Nommed(self.food_reward),
                    None => StepResult::BoardFull,
                }
            }
            Move::Advance => {
                self.push_head(next);
                if let Some(tail) = self.snek.pop_tail() {
                    self.grid.place(tail, Cell::Empty);
                }
                StepResult::Ongoing
            }
        }
    }

    fn push_head(&mut self, pos: Pos) {
        self.grid.place(pos, Cell::Snake);
        self.snek.push_head(pos);
    }
}
