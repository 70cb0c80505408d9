use crate::snek::Direction;

/// Terminal-independent key press as seen by the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Esc,
    /// Ctrl-C
    Interrupt,
}

pub const PAUSE_KEY: char = ' ';
pub const QUIT_KEY: char = 'q';
pub const RESTART_KEY: char = 'r';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    Pause,
    Quit,
}

impl Command {
    /// Arrows, `wasd` and `hjkl` all steer.
    pub fn from_key(key: Key) -> Option<Command> {
        let command = match key {
            Key::Up | Key::Char('w') | Key::Char('k') => Command::Steer(Direction::Up),
            Key::Down | Key::Char('s') | Key::Char('j') => Command::Steer(Direction::Down),
            Key::Left | Key::Char('a') | Key::Char('h') => Command::Steer(Direction::Left),
            Key::Right | Key::Char('d') | Key::Char('l') => Command::Steer(Direction::Right),
            Key::Char(PAUSE_KEY) => Command::Pause,
            Key::Char(QUIT_KEY) | Key::Esc | Key::Interrupt => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}
