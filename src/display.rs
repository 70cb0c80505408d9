use crate::grid::{Cell, Grid};
use crate::high_scores::HighScore;
use crate::input::Key;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::io::{self, Stdout};
use std::time::Duration;

const SIDEBAR_WIDTH: u16 = 22;

/// Panels drawn on top of the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Overlay<'a> {
    /// `best` is the top stored score, shown in the title bar.
    Splash { pause_enabled: bool, best: u32 },
    /// Remembered and drawn beside the board from now on.
    Sidebar(&'a [HighScore]),
    Paused,
    NamePrompt { score: u32, name: &'a str },
    HighScores { score: u32, records: &'a [HighScore] },
    PlayAgain,
}

/// Where the game draws itself and gets its keys from.
pub trait Surface {
    fn render(&mut self, grid: &Grid, score: u32) -> io::Result<()>;
    fn render_overlay(&mut self, overlay: Overlay<'_>) -> io::Result<()>;
    /// Non-blocking polls return `Ok(None)` when no key is waiting.
    fn poll_key(&mut self, blocking: bool) -> io::Result<Option<Key>>;
}

pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    board: Option<Grid>,
    score: u32,
    best: u32,
    sidebar: Vec<HighScore>,
}

impl TerminalSurface<CrosstermBackend<Stdout>> {
    /// Switches the terminal to raw mode on the alternate screen.
    pub fn start() -> io::Result<Self> {
        enable_raw_mode()?;
        let setup = (|| -> io::Result<Self> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
            terminal.hide_cursor()?;
            terminal.clear()?;
            Ok(Self::new(terminal))
        })();
        restore_on_error(setup, || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        })
    }

    pub fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl<B: Backend> TerminalSurface<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        TerminalSurface {
            terminal,
            board: None,
            score: 0,
            best: 0,
            sidebar: Vec::new(),
        }
    }

    fn draw(&mut self, overlay: Option<Overlay<'_>>) -> io::Result<()> {
        let Self {
            terminal,
            board,
            score,
            best,
            sidebar,
        } = self;
        let best = (*best).max(*score);
        terminal.draw(|frame| {
            draw_screen(frame, board.as_ref(), *score, best, sidebar.as_slice(), overlay)
        })?;
        Ok(())
    }
}

impl<B: Backend> Surface for TerminalSurface<B> {
    fn render(&mut self, grid: &Grid, score: u32) -> io::Result<()> {
        match &mut self.board {
            Some(board) => board.clone_from(grid),
            None => self.board = Some(grid.clone()),
        }
        self.score = score;
        self.draw(None)
    }

    fn render_overlay(&mut self, overlay: Overlay<'_>) -> io::Result<()> {
        match overlay {
            Overlay::Sidebar(records) => {
                self.sidebar = records.to_vec();
                Ok(())
            }
            Overlay::Splash { best, .. } => {
                self.board = None;
                self.score = 0;
                self.best = best;
                self.draw(Some(overlay))
            }
            _ => self.draw(Some(overlay)),
        }
    }

    fn poll_key(&mut self, blocking: bool) -> io::Result<Option<Key>> {
        loop {
            if !blocking && !event::poll(Duration::ZERO)? {
                return Ok(None);
            }
            if let Event::Key(key) = event::read()? {
                if let Some(key) = key_from_event(key) {
                    return Ok(Some(key));
                }
            }
            if !blocking {
                return Ok(None);
            }
        }
    }
}

/// Leaves the terminal usable when setup fails halfway.
fn restore_on_error<T>(result: io::Result<T>, restore: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        restore();
    }
    result
}

fn key_from_event(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let mapped = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace | KeyCode::Delete => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        _ => return None,
    };
    Some(mapped)
}

fn draw_screen(
    frame: &mut Frame,
    board: Option<&Grid>,
    score: u32,
    best: u32,
    sidebar: &[HighScore],
    overlay: Option<Overlay<'_>>,
) {
    let layout = Layout::default()
        .direction(layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + scores
            Constraint::Min(0),    // Game area
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(format!(
            "CURSNEK    High Score: {}    Score: {}",
            best, score
        ))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL)),
        layout[0],
    );

    let game_area = layout[1];
    if let Some(grid) = board {
        let board_area = Rect::new(
            game_area.x,
            game_area.y,
            (grid.width() + 2).min(game_area.width),
            (grid.height() + 2).min(game_area.height),
        );
        let block = Block::default()
            .title(format!(" SCORE: {} ", score))
            .borders(Borders::ALL);
        let inner_area = block.inner(board_area);
        frame.render_widget(block, board_area);
        frame.render_widget(BoardView(grid), inner_area);

        if !sidebar.is_empty() {
            let sidebar_area = Rect::new(
                board_area.right(),
                game_area.y,
                SIDEBAR_WIDTH.min(game_area.right().saturating_sub(board_area.right())),
                (sidebar.len() as u16 + 2).min(game_area.height),
            );
            frame.render_widget(
                Paragraph::new(score_lines(sidebar))
                    .block(Block::default().title("TOP 10:").borders(Borders::ALL)),
                sidebar_area,
            );
        }
    }

    let Some(overlay) = overlay else {
        return;
    };
    let (lines, width, height) = match overlay {
        Overlay::Splash { pause_enabled, .. } => {
            let mut lines = vec![
                Line::from("cursnek".bold()),
                Line::from(""),
                Line::from("Move with arrows / wasd / hjkl."),
            ];
            if pause_enabled {
                lines.push(Line::from("Pause with space."));
            }
            lines.push(Line::from("Exit with q."));
            lines.push(Line::from(""));
            lines.push(Line::from("Press any key to start."));
            (lines, 40, 11)
        }
        Overlay::Paused => (vec![Line::from("PAUSED".bold())], 14, 3),
        Overlay::NamePrompt { score, name } => (
            vec![
                Line::from(format!("FINAL SCORE: {}", score).bold()),
                Line::from(""),
                Line::from("Enter your name:"),
                Line::from(format!("{}_", name)),
            ],
            30,
            6,
        ),
        Overlay::HighScores { score, records } => {
            let mut lines = vec![
                Line::from(format!("FINAL SCORE: {}", score).bold()),
                Line::from("TOP 10:"),
            ];
            lines.extend(score_lines(records));
            lines.push(Line::from(""));
            lines.push(Line::from("Press q to exit"));
            let height = lines.len() as u16 + 2;
            (lines, 36, height)
        }
        Overlay::PlayAgain => (
            vec![
                Line::from("GAME OVER".bold()),
                Line::from(""),
                Line::from("r to restart"),
                Line::from("any other key to exit"),
            ],
            30,
            6,
        ),
        Overlay::Sidebar(_) => return,
    };

    let area = popup_area(game_area, width, height);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn score_lines(records: &[HighScore]) -> Vec<Line<'static>> {
    records
        .iter()
        .map(|record| Line::from(record.to_string()))
        .collect()
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

struct BoardView<'a>(&'a Grid);

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (pos, cell) in self.0.cells() {
            let (x, y) = (pos.x as u16, pos.y as u16);
            if x >= area.width || y >= area.height {
                continue;
            }
            match cell {
                Cell::Empty => {}
                Cell::Snake => {
                    buf[(area.x + x, area.y + y)]
                        .set_symbol(" ")
                        .set_bg(Color::Green);
                }
                Cell::Food => {
                    buf[(area.x + x, area.y + y)]
                        .set_symbol("@")
                        .set_fg(Color::LightRed);
                }
            }
        }
    }
}
