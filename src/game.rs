use crate::config::GameConfig;
use crate::display::{Overlay, Surface};
use crate::high_scores::{self, HighScore, HighScoreStore, MAX_NAME_LEN};
use crate::input::{Command, Key, QUIT_KEY, RESTART_KEY};
use crate::session::GameSession;
use crate::snek::Direction;
use log::{error, info};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::io;
use std::thread;
use std::time::Instant;

#[derive(Debug)]
pub enum GameState {
    AwaitingStart,
    Running(GameSession),
    Paused(GameSession),
    GameOver { final_score: u32 },
    Terminated,
}

pub struct Game<R = ThreadRng> {
    state: GameState,
    config: GameConfig,
    store: HighScoreStore,
    rng: R,
}

impl Game<ThreadRng> {
    pub fn new(config: GameConfig, store: HighScoreStore) -> Self {
        Self::with_rng(config, store, rand::thread_rng())
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(config: GameConfig, store: HighScoreStore, rng: R) -> Self {
        Game {
            state: GameState::AwaitingStart,
            config,
            store,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Plays rounds until the player quits or declines a restart.
    pub fn run(&mut self, surface: &mut impl Surface) -> io::Result<()> {
        while !matches!(self.state, GameState::Terminated) {
            self.step(surface)?;
        }
        Ok(())
    }

    /// Runs the current state once: one tick while running, one blocking
    /// read while waiting on the player.
    pub fn step(&mut self, surface: &mut impl Surface) -> io::Result<()> {
        let state = std::mem::replace(&mut self.state, GameState::Terminated);
        self.state = match state {
            GameState::AwaitingStart => self.await_start(surface)?,
            GameState::Running(session) => self.tick(session, surface)?,
            GameState::Paused(session) => self.resume(session, surface)?,
            GameState::GameOver { final_score } => self.game_over(final_score, surface)?,
            GameState::Terminated => GameState::Terminated,
        };
        Ok(())
    }

    fn await_start(&mut self, surface: &mut impl Surface) -> io::Result<GameState> {
        let ranked = self.store.ranked().unwrap_or_else(|e| {
            error!("Error loading high scores: {}", e);
            Vec::new()
        });
        if self.config.show_sidebar {
            surface.render_overlay(Overlay::Sidebar(high_scores::top(&ranked)))?;
        }
        surface.render_overlay(Overlay::Splash {
            pause_enabled: self.config.pause_enabled,
            best: ranked.first().map_or(0, |r| r.score),
        })?;

        let Some(key) = surface.poll_key(true)? else {
            return Ok(GameState::AwaitingStart);
        };
        let direction = match Command::from_key(key) {
            Some(Command::Quit) => {
                info!("Quit from the start screen");
                return Ok(GameState::Terminated);
            }
            Some(Command::Steer(direction)) => direction,
            _ => Direction::Up,
        };

        let session = GameSession::new(&self.config, direction, &mut self.rng)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        info!("Round started heading {:?}", direction);
        surface.render(session.grid(), session.score())?;
        Ok(GameState::Running(session))
    }

    fn tick(
        &mut self,
        mut session: GameSession,
        surface: &mut impl Surface,
    ) -> io::Result<GameState> {
        let started = Instant::now();

        if let Some(key) = surface.poll_key(false)? {
            match Command::from_key(key) {
                Some(Command::Quit) => {
                    info!("Quit mid-round at score {}, not recorded", session.score());
                    return Ok(GameState::Terminated);
                }
                Some(Command::Pause) if self.config.pause_enabled => {
                    surface.render_overlay(Overlay::Paused)?;
                    return Ok(GameState::Paused(session));
                }
                Some(Command::Steer(direction)) => session.change_direction(direction),
                _ => {}
            }
        }

        let step = session.tick(&mut self.rng);
        if step.is_over() {
            info!("Round over ({:?}) with score {}", step, session.score());
            return Ok(GameState::GameOver {
                final_score: session.score(),
            });
        }

        surface.render(session.grid(), session.score())?;
        if let Some(rest) = self.config.tick().checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
        Ok(GameState::Running(session))
    }

    fn resume(
        &mut self,
        session: GameSession,
        surface: &mut impl Surface,
    ) -> io::Result<GameState> {
        match surface.poll_key(true)?.and_then(Command::from_key) {
            Some(Command::Pause) => {
                surface.render(session.grid(), session.score())?;
                Ok(GameState::Running(session))
            }
            Some(Command::Quit) => {
                info!("Quit while paused at score {}, not recorded", session.score());
                Ok(GameState::Terminated)
            }
            _ => Ok(GameState::Paused(session)),
        }
    }

    fn game_over(&mut self, final_score: u32, surface: &mut impl Surface) -> io::Result<GameState> {
        let name = read_name(final_score, surface)?;
        let record = HighScore::new(final_score, &name);
        info!("Recording {}", record);
        let ranked = match self.store.record(record.clone()) {
            Ok(ranked) => ranked,
            Err(e) => {
                error!("Error saving high score: {}", e);
                vec![record]
            }
        };

        surface.render_overlay(Overlay::HighScores {
            score: final_score,
            records: high_scores::top(&ranked),
        })?;
        while !matches!(
            surface.poll_key(true)?,
            Some(Key::Char(QUIT_KEY) | Key::Enter | Key::Esc | Key::Interrupt)
        ) {}

        surface.render_overlay(Overlay::PlayAgain)?;
        match surface.poll_key(true)? {
            Some(Key::Char(RESTART_KEY)) => {
                info!("Restarting");
                Ok(GameState::AwaitingStart)
            }
            _ => Ok(GameState::Terminated),
        }
    }
}

/// Line entry on the name prompt; Enter confirms.
fn read_name(score: u32, surface: &mut impl Surface) -> io::Result<String> {
    let mut name = String::new();
    loop {
        surface.render_overlay(Overlay::NamePrompt { score, name: &name })?;
        match surface.poll_key(true)? {
            Some(Key::Enter) => return Ok(name),
            Some(Key::Backspace) => {
                name.pop();
            }
            Some(Key::Char(c))
                if !c.is_whitespace() && !c.is_control() && name.chars().count() < MAX_NAME_LEN =>
            {
                name.push(c)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Pos};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Keys for blocking reads come from `waiting`; each tick's non-blocking
    /// read takes one entry from `live`.
    #[derive(Default)]
    struct ScriptedSurface {
        waiting: VecDeque<Key>,
        live: VecDeque<Option<Key>>,
        overlays: Vec<String>,
        renders: usize,
        last_score: u32,
        best: u32,
        render_delay: Duration,
    }

    impl ScriptedSurface {
        fn new(waiting: &[Key], live: &[Option<Key>]) -> Self {
            ScriptedSurface {
                waiting: waiting.iter().copied().collect(),
                live: live.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn saw(&self, label: &str) -> bool {
            self.overlays.iter().any(|o| o == label)
        }
    }

    impl Surface for ScriptedSurface {
        fn render(&mut self, _grid: &Grid, score: u32) -> io::Result<()> {
            thread::sleep(self.render_delay);
            self.renders += 1;
            self.last_score = score;
            Ok(())
        }

        fn render_overlay(&mut self, overlay: Overlay<'_>) -> io::Result<()> {
            let label = match overlay {
                Overlay::Splash { best, .. } => {
                    self.best = best;
                    "splash".to_string()
                }
                Overlay::Sidebar(records) => format!("sidebar:{}", records.len()),
                Overlay::Paused => "paused".to_string(),
                Overlay::NamePrompt { name, .. } => format!("name:{}", name),
                Overlay::HighScores { score, records } => {
                    format!("scores:{}:{}", score, records.len())
                }
                Overlay::PlayAgain => "play-again".to_string(),
            };
            self.overlays.push(label);
            Ok(())
        }

        fn poll_key(&mut self, blocking: bool) -> io::Result<Option<Key>> {
            if !blocking {
                return Ok(self.live.pop_front().flatten());
            }
            match self.waiting.pop_front() {
                Some(key) => Ok(Some(key)),
                None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script ran out")),
            }
        }
    }

    fn temp_store() -> HighScoreStore {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "cursnek-game-test-{}-{}.txt",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_file(&path);
        HighScoreStore::new(path)
    }

    fn config() -> GameConfig {
        GameConfig {
            grid_width: 10,
            grid_height: 10,
            tick_millis: 0,
            pause_enabled: true,
            food_reward: 100,
            show_sidebar: true,
        }
    }

    fn game(config: GameConfig, store: &HighScoreStore) -> Game<StdRng> {
        Game::with_rng(config, store.clone(), StdRng::seed_from_u64(7))
    }

    fn running(game: &Game<StdRng>) -> &GameSession {
        match game.state() {
            GameState::Running(session) => session,
            other => panic!("expected a running game, got {:?}", other),
        }
    }

    #[test]
    fn test_quit_on_start_screen() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('q')], &[]);

        game.run(&mut surface).unwrap();

        assert!(matches!(game.state(), GameState::Terminated));
        assert_eq!(surface.overlays, vec!["sidebar:0", "splash"]);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_start_key_picks_direction() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('l')], &[]);

        game.step(&mut surface).unwrap();

        let session = running(&game);
        assert_eq!(session.snek().direction(), Direction::Right);
        assert_eq!(session.snek().head(), Pos::new(5, 5));
        assert_eq!(surface.renders, 1);
    }

    #[test]
    fn test_other_start_key_heads_up() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(&[Key::Enter], &[]);

        game.step(&mut surface).unwrap();

        assert_eq!(running(&game).snek().direction(), Direction::Up);
    }

    #[test]
    fn test_reversal_is_ignored_during_play() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('k')], &[Some(Key::Down)]);

        game.step(&mut surface).unwrap();
        game.step(&mut surface).unwrap();

        let session = running(&game);
        assert_eq!(session.snek().direction(), Direction::Up);
        assert_eq!(session.snek().head(), Pos::new(5, 4));
    }

    #[test]
    fn test_unmapped_key_keeps_direction() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('a')], &[Some(Key::Char('x'))]);

        game.step(&mut surface).unwrap();
        game.step(&mut surface).unwrap();

        let session = running(&game);
        assert_eq!(session.snek().direction(), Direction::Left);
        assert_eq!(session.snek().head(), Pos::new(4, 5));
    }

    #[test]
    fn test_quit_mid_round_records_nothing() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface =
            ScriptedSurface::new(&[Key::Char('d')], &[None, None, Some(Key::Char('q'))]);

        game.run(&mut surface).unwrap();

        assert!(matches!(game.state(), GameState::Terminated));
        assert!(!surface.saw("play-again"));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_pause_and_resume() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(
            &[Key::Char('k'), Key::Char('x'), Key::Up, Key::Char(' ')],
            &[Some(Key::Char(' '))],
        );

        game.step(&mut surface).unwrap();
        game.step(&mut surface).unwrap();
        assert!(matches!(game.state(), GameState::Paused(_)));
        assert!(surface.saw("paused"));

        // Neither a stray key nor a steering key unpauses or moves the snake.
        game.step(&mut surface).unwrap();
        game.step(&mut surface).unwrap();
        match game.state() {
            GameState::Paused(session) => assert_eq!(session.snek().head(), Pos::new(5, 5)),
            other => panic!("expected a paused game, got {:?}", other),
        }

        game.step(&mut surface).unwrap();
        assert_eq!(running(&game).snek().head(), Pos::new(5, 5));
    }

    #[test]
    fn test_quit_while_paused() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface =
            ScriptedSurface::new(&[Key::Char('k'), Key::Esc], &[Some(Key::Char(' '))]);

        game.run(&mut surface).unwrap();

        assert!(matches!(game.state(), GameState::Terminated));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_pause_key_ignored_without_pause() {
        let store = temp_store();
        let config = GameConfig {
            pause_enabled: false,
            ..config()
        };
        let mut game = game(config, &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('k')], &[Some(Key::Char(' '))]);

        game.step(&mut surface).unwrap();
        game.step(&mut surface).unwrap();

        assert_eq!(running(&game).snek().head(), Pos::new(5, 4));
        assert!(!surface.saw("paused"));
    }

    #[test]
    fn test_wall_death_records_named_score() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(
            &[
                Key::Char('k'),
                // name entry
                Key::Char('a'),
                Key::Char('d'),
                Key::Char('x'),
                Key::Backspace,
                Key::Char(' '),
                Key::Enter,
                // leave the high-score list, then decline a restart
                Key::Char('z'),
                Key::Char('q'),
                Key::Char('n'),
            ],
            &[],
        );

        game.run(&mut surface).unwrap();

        assert!(matches!(game.state(), GameState::Terminated));
        assert!(surface.saw("name:adx"));
        assert!(surface.saw("name:ad"));
        assert!(surface.saw("play-again"));

        let contents = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let record = HighScore::parse(lines[0]).unwrap();
        assert_eq!(record.name, "ad");
        assert_eq!(record.score, surface.last_score);
        assert_eq!(record.score % 100, 0);
        assert!(surface.saw(&format!("scores:{}:1", record.score)));
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_empty_name_and_restart() {
        let store = temp_store();
        store.append(&HighScore::new(5000, "champ")).unwrap();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(
            &[
                Key::Char('a'),
                Key::Enter,
                Key::Enter,
                Key::Char('r'),
                Key::Char('q'),
            ],
            &[],
        );

        game.run(&mut surface).unwrap();

        assert_eq!(
            surface.overlays.iter().filter(|o| *o == "splash").count(),
            2
        );
        assert!(surface.saw("sidebar:1"));
        assert!(surface.saw("sidebar:2"));
        let records: Vec<_> = store.load().unwrap().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], HighScore::new(5000, "champ"));
        assert_eq!(records[1].name, "anonymous");
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_classic_title_gets_stored_best() {
        let store = temp_store();
        store.append(&HighScore::new(5000, "champ")).unwrap();
        store.append(&HighScore::new(800, "ada")).unwrap();
        let config = GameConfig {
            pause_enabled: false,
            show_sidebar: false,
            ..config()
        };
        let mut game = game(config, &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('k')], &[]);

        game.step(&mut surface).unwrap();

        assert_eq!(surface.best, 5000);
        assert_eq!(surface.overlays, vec!["splash"]);
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn test_empty_store_best_is_zero() {
        let store = temp_store();
        let mut game = game(config(), &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('k')], &[]);

        game.step(&mut surface).unwrap();

        assert_eq!(surface.best, 0);
    }

    #[test]
    fn test_tick_waits_out_its_budget() {
        let store = temp_store();
        let config = GameConfig {
            tick_millis: 40,
            ..config()
        };
        let mut game = game(config, &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('k')], &[]);
        game.step(&mut surface).unwrap();

        let started = Instant::now();
        game.step(&mut surface).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(40));
        assert!(matches!(game.state(), GameState::Running(_)));
    }

    #[test]
    fn test_render_time_counts_against_the_tick() {
        let store = temp_store();
        let config = GameConfig {
            tick_millis: 200,
            ..config()
        };
        let mut game = game(config, &store);
        let mut surface = ScriptedSurface::new(&[Key::Char('k')], &[]);
        game.step(&mut surface).unwrap();
        surface.render_delay = Duration::from_millis(150);

        let started = Instant::now();
        game.step(&mut surface).unwrap();
        let elapsed = started.elapsed();

        // Sleeping the full budget on top of the render would take 350ms.
        assert!(elapsed >= Duration::from_millis(200), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(330), "{:?}", elapsed);
        assert_eq!(surface.renders, 2);
    }
}
