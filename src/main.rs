use clap::Parser;
use cursnek::config::Variant;
use cursnek::display::TerminalSurface;
use cursnek::game::Game;
use cursnek::high_scores::{HighScoreStore, HIGH_SCORE_FILE};
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Board preset to play on.
    #[arg(long, value_enum, default_value_t = Variant::Deluxe)]
    variant: Variant,
    /// File the high-score list is appended to.
    #[arg(long = "high-scores", value_name = "PATH", default_value = HIGH_SCORE_FILE)]
    high_scores: PathBuf,
    /// Log destination. The terminal itself belongs to the game.
    #[arg(long = "log-file", value_name = "PATH", default_value = "cursnek.log")]
    log_file: PathBuf,
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();

    // Set up logging before anything else
    WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create(&args.log_file)?,
    )
    .map_err(io::Error::other)?;

    info!("Starting cursnek ({:?})", args.variant);

    let mut game = Game::new(args.variant.config(), HighScoreStore::new(args.high_scores));
    let mut surface = TerminalSurface::start()?;

    let res = game.run(&mut surface);

    // Restore the terminal even when the game failed
    surface.restore()?;

    if let Err(e) = res {
        error!("Game aborted: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    info!("Exiting");
    Ok(())
}
