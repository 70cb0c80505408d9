use clap::ValueEnum;
use std::time::Duration;

pub const FOOD_REWARD: u32 = 100;
pub const TICK_MILLIS: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub grid_width: u16,
    pub grid_height: u16,
    pub tick_millis: u64,
    pub pause_enabled: bool,
    pub food_reward: u32,
    /// Top-10 list next to the board while playing.
    pub show_sidebar: bool,
}

impl GameConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Variant::default().config()
    }
}

/// Board presets. Only the presentation extras differ between them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Larger board, no pause, no sidebar
    Classic,
    /// Smaller board with pause and a high-score sidebar
    #[default]
    Deluxe,
}

impl Variant {
    pub fn config(self) -> GameConfig {
        match self {
            Variant::Classic => GameConfig {
                grid_width: 58,
                grid_height: 26,
                tick_millis: TICK_MILLIS,
                pause_enabled: false,
                food_reward: FOOD_REWARD,
                show_sidebar: false,
            },
            Variant::Deluxe => GameConfig {
                grid_width: 54,
                grid_height: 20,
                tick_millis: TICK_MILLIS,
                pause_enabled: true,
                food_reward: FOOD_REWARD,
                show_sidebar: true,
            },
        }
    }
}
