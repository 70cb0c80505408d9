pub mod collision;
pub mod config;
pub mod display;
pub mod game;
pub mod grid;
pub mod high_scores;
pub mod input;
pub mod session;
pub mod snek;
