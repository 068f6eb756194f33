//! pacterm
//!
//! Plays every `*.lvl` level in a directory, in file name order.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pacterm::{
    game::progression::{GameOutcome, LevelFiles, LevelSource},
    frontend::{HeadlessFrontend, TerminalFrontend},
    Game, GameConfig, GameSummary, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "pacterm", version, about = "Terminal Pac-Man")]
struct Args {
    /// Directory holding the `.lvl` files
    level_dir: PathBuf,

    /// Replay scripted levels without a terminal
    #[arg(long)]
    headless: bool,

    /// Seed for random moves (overrides PACTERM_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Skip every display pause
    #[arg(long)]
    no_delay: bool,

    /// Diagnostic log destination
    #[arg(long, default_value = "debug.log")]
    log_file: PathBuf,

    /// Write a JSON game summary here
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("pacterm v{}", VERSION);

    let mut config = GameConfig::from_env();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.no_delay |= args.no_delay;

    let levels = LevelFiles::discover(&args.level_dir)
        .with_context(|| format!("failed to read level directory {}", args.level_dir.display()))?;
    if levels.level_count() == 0 {
        bail!("no .lvl files in {}", args.level_dir.display());
    }
    info!(count = levels.level_count(), seed = config.seed, "levels found");

    let mut game = Game::new(levels, config)?;
    let summary = if args.headless {
        game.run(&mut HeadlessFrontend::new())?
    } else {
        let mut frontend = TerminalFrontend::new().context("failed to set up the terminal")?;
        let result = game.run(&mut frontend);
        frontend.restore().context("failed to restore the terminal")?;
        result?
    };

    report(&summary);

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
    }

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("failed to create log file {}", args.log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(())
}

fn report(summary: &GameSummary) {
    let headline = match summary.outcome {
        GameOutcome::Victory => "You win!".to_string(),
        GameOutcome::GameOver(reason) => format!("Game over ({reason:?})"),
    };
    info!(?summary, "game finished");
    println!(
        "{headline} Points: {}, levels cleared: {}, frames: {}",
        summary.final_score, summary.levels_cleared, summary.frames
    );
    if let Some(hash) = &summary.final_state_hash {
        println!("Final state hash: {hash}");
    }
}
