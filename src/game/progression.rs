//! Level Progression
//!
//! Sequences levels, carries the score from one level to the next and
//! decides how the game ends.
//!
//! ```text
//! LoadingLevel(i) ──> PlayingLevel(i) ──NextLevel──> LevelCleared(i) ──> LoadingLevel(i+1)
//!                           │                               │
//!                        QuitGame                      last level
//!                           v                               v
//!                       GameOver                         Victory
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::core::hash::StateHash;
use crate::core::rng::derive_level_seed;
use crate::frontend::{DrawMode, Frontend};
use crate::game::loader::{self, LoadError};
use crate::game::state::Board;
use crate::game::turn::{play_frame, FrameOutcome};

/// Pause between polls when an interactive pacman has no key yet.
pub const IDLE_POLL_MS: u64 = 10;

// =============================================================================
// PHASES
// =============================================================================

/// Why the game ended early.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A quit command was issued
    Quit,
    /// A ghost caught pacman
    PacmanDied,
}

/// Progression phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    LoadingLevel { index: usize },
    PlayingLevel { index: usize },
    LevelCleared { index: usize },
    GameOver(GameOverReason),
    Victory,
}

impl Phase {
    /// True once the game has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver(_) | Phase::Victory)
    }
}

// =============================================================================
// LEVEL SOURCES
// =============================================================================

/// Ordered collection of levels.
pub trait LevelSource {
    fn level_count(&self) -> usize;

    fn level_name(&self, index: usize) -> String;

    /// Build a fresh board for level `index`.
    fn load(&self, index: usize) -> Result<Board, LoadError>;
}

/// Levels stored as files, played in the given order.
#[derive(Debug, Clone)]
pub struct LevelFiles(pub Vec<PathBuf>);

impl LevelFiles {
    /// Every `*.lvl` file in `dir`, sorted by file name.
    pub fn discover(dir: &Path) -> io::Result<Self> {
        loader::discover_levels(dir).map(Self)
    }
}

impl LevelSource for LevelFiles {
    fn level_count(&self) -> usize {
        self.0.len()
    }

    fn level_name(&self, index: usize) -> String {
        self.0
            .get(index)
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn load(&self, index: usize) -> Result<Board, LoadError> {
        let path = self.0.get(index).ok_or(LoadError::NoSuchLevel { index })?;
        loader::load_level(path)
    }
}

/// Levels held in memory as `(name, text)` pairs.
#[derive(Debug, Clone, Default)]
pub struct InlineLevels(pub Vec<(String, String)>);

impl InlineLevels {
    pub fn new<N, T>(levels: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self(levels.into_iter().map(|(n, t)| (n.into(), t.into())).collect())
    }
}

impl LevelSource for InlineLevels {
    fn level_count(&self) -> usize {
        self.0.len()
    }

    fn level_name(&self, index: usize) -> String {
        self.0.get(index).map(|(name, _)| name.clone()).unwrap_or_default()
    }

    fn load(&self, index: usize) -> Result<Board, LoadError> {
        match self.0.get(index) {
            Some((name, text)) => loader::parse_level(name, text),
            None => Err(LoadError::NoSuchLevel { index }),
        }
    }
}

// =============================================================================
// ERRORS & SUMMARY
// =============================================================================

/// Errors that abort a game.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to load level {level}: {source}")]
    Load {
        level: String,
        #[source]
        source: LoadError,
    },

    #[error("no levels to play")]
    NoLevels,

    #[error("frontend error: {0}")]
    Frontend(#[from] io::Error),
}

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Victory,
    GameOver(GameOverReason),
}

/// Result of a finished game, written by `--summary`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub outcome: GameOutcome,
    pub final_score: u32,
    pub levels_cleared: usize,
    /// Frames resolved across all levels
    pub frames: u64,
    /// Hex SHA-256 of the last board when its level ended
    pub final_state_hash: Option<String>,
}

// =============================================================================
// GAME
// =============================================================================

/// A game over a sequence of levels.
pub struct Game<S: LevelSource> {
    levels: S,
    config: GameConfig,
    phase: Phase,
    board: Option<Board>,
    carried_points: u32,
    levels_cleared: usize,
    frames: u64,
    last_hash: Option<StateHash>,
}

impl<S: LevelSource> Game<S> {
    pub fn new(levels: S, config: GameConfig) -> Result<Self, GameError> {
        if levels.level_count() == 0 {
            return Err(GameError::NoLevels);
        }
        Ok(Self {
            levels,
            config,
            phase: Phase::LoadingLevel { index: 0 },
            board: None,
            carried_points: 0,
            levels_cleared: 0,
            frames: 0,
            last_hash: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Live board, if a level is loaded.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Score carried into the next level.
    pub fn carried_points(&self) -> u32 {
        self.carried_points
    }

    /// Advance by one transition (one frame while playing).
    pub fn step<F: Frontend>(&mut self, frontend: &mut F) -> Result<Phase, GameError> {
        match self.phase {
            Phase::LoadingLevel { index } => self.enter_level(index, frontend)?,
            Phase::PlayingLevel { index } => self.play(index, frontend)?,
            Phase::LevelCleared { index } => self.leave_level(index, frontend)?,
            Phase::GameOver(_) | Phase::Victory => {}
        }
        Ok(self.phase)
    }

    /// Play until the game ends.
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) -> Result<GameSummary, GameError> {
        while !self.phase.is_terminal() {
            self.step(frontend)?;
        }
        self.summary().ok_or(GameError::NoLevels)
    }

    /// Summary of a finished game, `None` while still playing.
    pub fn summary(&self) -> Option<GameSummary> {
        let outcome = match self.phase {
            Phase::Victory => GameOutcome::Victory,
            Phase::GameOver(reason) => GameOutcome::GameOver(reason),
            _ => return None,
        };
        Some(GameSummary {
            outcome,
            final_score: self.carried_points,
            levels_cleared: self.levels_cleared,
            frames: self.frames,
            final_state_hash: self.last_hash.map(hex::encode),
        })
    }

    fn enter_level<F: Frontend>(&mut self, index: usize, frontend: &mut F) -> Result<(), GameError> {
        self.board = None;

        let mut board = self.levels.load(index).map_err(|source| GameError::Load {
            level: self.levels.level_name(index),
            source,
        })?;
        board.reseed(derive_level_seed(self.config.seed, &board.name));
        board.carry_points(self.carried_points);

        info!(level = %board.name, index, carried = self.carried_points, "level started");

        frontend.draw(&board, DrawMode::Menu)?;
        frontend.flush()?;

        self.board = Some(board);
        self.phase = Phase::PlayingLevel { index };
        Ok(())
    }

    fn play<F: Frontend>(&mut self, index: usize, frontend: &mut F) -> Result<(), GameError> {
        let Some(board) = self.board.as_mut() else {
            self.phase = Phase::LoadingLevel { index };
            return Ok(());
        };

        let result = play_frame(board, || frontend.next_command());
        for event in &result.events {
            if event.is_terminal() {
                info!(frame = event.frame, data = ?event.data, "game event");
            } else {
                debug!(frame = event.frame, data = ?event.data, "game event");
            }
        }

        match result.outcome {
            FrameOutcome::ContinuePlay => {
                frontend.draw(board, DrawMode::Play)?;
                frontend.flush()?;
                let delay = match result.pacman_move {
                    None if board.tempo_ms == 0 => IDLE_POLL_MS,
                    _ => board.tempo_ms,
                };
                frontend.pause(self.config.pacing(delay));
            }
            FrameOutcome::NextLevel => {
                self.record_level_end();
                self.levels_cleared += 1;
                self.phase = Phase::LevelCleared { index };
                info!(index, score = self.carried_points, "level cleared");
            }
            FrameOutcome::QuitGame => {
                let reason = if board.pacmans.first().is_some_and(|p| !p.alive) {
                    GameOverReason::PacmanDied
                } else {
                    GameOverReason::Quit
                };
                self.record_level_end();
                if let Some(board) = self.board.as_ref() {
                    frontend.draw(board, DrawMode::GameOver)?;
                    frontend.flush()?;
                }
                frontend.pause(self.config.pacing(self.config.end_screen_ms));
                self.board = None;
                self.phase = Phase::GameOver(reason);
                info!(?reason, score = self.carried_points, "game over");
            }
        }
        Ok(())
    }

    fn leave_level<F: Frontend>(&mut self, index: usize, frontend: &mut F) -> Result<(), GameError> {
        if index + 1 < self.levels.level_count() {
            self.board = None;
            self.phase = Phase::LoadingLevel { index: index + 1 };
            return Ok(());
        }

        if let Some(board) = self.board.as_ref() {
            frontend.draw(board, DrawMode::Victory)?;
            frontend.flush()?;
        }
        frontend.pause(self.config.pacing(self.config.end_screen_ms));
        self.board = None;
        self.phase = Phase::Victory;
        info!(score = self.carried_points, levels = self.levels_cleared, "victory");
        Ok(())
    }

    /// Capture score, frame count and state hash of the level just ended.
    fn record_level_end(&mut self) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        if !board.pacmans.is_empty() {
            self.carried_points = board.score();
        }
        self.frames += board.frame;
        let hash = board.compute_hash();
        debug!(level = %board.name, frames = board.frame, hash = %hex::encode(hash), "level ended");
        self.last_hash = Some(hash);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Direction;
    use crate::frontend::HeadlessFrontend;
    use crate::game::command::Command;
    use std::fs;

    // Two pickups then the portal: 3 frames, 2 points
    const PICKUP_RUN: &str = "DIM 3 6\nPACMAN 1 1\nD 1\nGRID\nXXXXXX\nX.oo@X\nXXXXXX\n";
    // One pickup then the portal: 2 frames, 1 point
    const SHORT_RUN: &str = "DIM 3 5\nPACMAN 1 1\nD 1\nGRID\nXXXXX\nX.o@X\nXXXXX\n";
    // Pacman stuck, ghost walks into it on frame 2
    const CHASE: &str = "DIM 3 6\nPACMAN 1 1\nS 1\nGHOST 1 3\nA 1\nGRID\nXXXXXX\nX....X\nXXXXXX\n";

    fn quiet() -> GameConfig {
        GameConfig {
            no_delay: true,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_no_levels() {
        let result = Game::new(InlineLevels::default(), quiet());
        assert!(matches!(result, Err(GameError::NoLevels)));
    }

    #[test]
    fn test_missing_level_index() {
        let inline = InlineLevels::new([("one", SHORT_RUN)]);
        assert!(matches!(inline.load(3), Err(LoadError::NoSuchLevel { index: 3 })));

        let files = LevelFiles(Vec::new());
        assert!(matches!(files.load(0), Err(LoadError::NoSuchLevel { index: 0 })));
    }

    #[test]
    fn test_score_carries_to_victory() {
        let levels = InlineLevels::new([("one", PICKUP_RUN), ("two", SHORT_RUN)]);
        let mut game = Game::new(levels, GameConfig::default()).unwrap();
        let mut frontend = HeadlessFrontend::new();

        let summary = game.run(&mut frontend).unwrap();

        assert_eq!(summary.outcome, GameOutcome::Victory);
        assert_eq!(summary.final_score, 3);
        assert_eq!(summary.levels_cleared, 2);
        assert_eq!(summary.frames, 5);
        assert!(summary.final_state_hash.is_some());
        assert!(game.board().is_none());

        use DrawMode::*;
        assert_eq!(frontend.modes(), vec![Menu, Play, Play, Menu, Play, Victory]);
        // Level two starts with level one's points
        assert_eq!(frontend.draws[3].level, "two");
        assert_eq!(frontend.draws[3].score, 2);
        assert_eq!(frontend.paused_ms(), 2000);
    }

    #[test]
    fn test_phase_sequence() {
        let levels = InlineLevels::new([("one", SHORT_RUN), ("two", SHORT_RUN)]);
        let mut game = Game::new(levels, quiet()).unwrap();
        let mut frontend = HeadlessFrontend::new();

        let mut phases = vec![game.phase()];
        while !game.phase().is_terminal() {
            phases.push(game.step(&mut frontend).unwrap());
        }

        assert_eq!(
            phases,
            vec![
                Phase::LoadingLevel { index: 0 },
                Phase::PlayingLevel { index: 0 },
                Phase::PlayingLevel { index: 0 },
                Phase::LevelCleared { index: 0 },
                Phase::LoadingLevel { index: 1 },
                Phase::PlayingLevel { index: 1 },
                Phase::PlayingLevel { index: 1 },
                Phase::LevelCleared { index: 1 },
                Phase::Victory,
            ]
        );
        assert_eq!(game.carried_points(), 2);
    }

    #[test]
    fn test_death_ends_game() {
        let levels = InlineLevels::new([("chase", CHASE), ("never", SHORT_RUN)]);
        let mut game = Game::new(levels, GameConfig::default()).unwrap();
        let mut frontend = HeadlessFrontend::new();

        let summary = game.run(&mut frontend).unwrap();

        assert_eq!(summary.outcome, GameOutcome::GameOver(GameOverReason::PacmanDied));
        assert_eq!(summary.levels_cleared, 0);
        assert_eq!(summary.frames, 2);
        assert_eq!(frontend.modes(), vec![DrawMode::Menu, DrawMode::Play, DrawMode::GameOver]);
        assert_eq!(frontend.pauses, vec![0, 2000]);
        assert!(frontend.draws.iter().all(|d| d.level == "chase"));
    }

    #[test]
    fn test_interactive_quit() {
        let open = "DIM 3 5\nPACMAN 1 2\nGRID\nXXXXX\nXo..X\nXXXXX\n";
        let levels = InlineLevels::new([("open", open)]);
        let mut game = Game::new(levels, quiet()).unwrap();
        // Left onto the pickup, then the queue runs dry and quits
        let mut frontend = HeadlessFrontend::with_inputs([Command::step(Direction::Left)]);

        let summary = game.run(&mut frontend).unwrap();

        assert_eq!(summary.outcome, GameOutcome::GameOver(GameOverReason::Quit));
        assert_eq!(summary.final_score, 1);
        assert_eq!(summary.frames, 2);
        assert!(frontend.pauses.iter().all(|&ms| ms == 0));
    }

    #[test]
    fn test_load_error_aborts() {
        let broken = "DIM 3 3\nGHOST 1 1\nGRID\nXXX\nX.X\nXXX\n";
        let levels = InlineLevels::new([("good", SHORT_RUN), ("broken", broken)]);
        let mut game = Game::new(levels, quiet()).unwrap();
        let mut frontend = HeadlessFrontend::new();

        let err = game.run(&mut frontend).unwrap_err();
        match err {
            GameError::Load { level, source } => {
                assert_eq!(level, "broken");
                assert!(matches!(source, LoadError::GhostWithoutMoves { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(game.board().is_none());
        assert_eq!(game.carried_points(), 1);
    }

    #[test]
    fn test_seeded_random_replays_identically() {
        let wander = "DIM 5 7\n\
                      PACMAN 1 1\n\
                      R 2\nD 1\nR 1\nQ\n\
                      GRID\n\
                      XXXXXXX\n\
                      X.o.o.X\n\
                      Xo.X.oX\n\
                      X.o.o.X\n\
                      XXXXXXX\n";

        let run = |seed| {
            let levels = InlineLevels::new([("wander", wander)]);
            let config = GameConfig { seed, ..quiet() };
            let mut game = Game::new(levels, config).unwrap();
            game.run(&mut HeadlessFrontend::new()).unwrap()
        };

        assert_eq!(run(7), run(7));
        assert_eq!(run(7).frames, 4);
    }

    #[test]
    fn test_levels_from_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("b.lvl"), SHORT_RUN).unwrap();
        fs::write(dir.join("a.lvl"), PICKUP_RUN).unwrap();

        let levels = LevelFiles::discover(dir).unwrap();
        assert_eq!(levels.level_name(0), "a.lvl");
        assert_eq!(levels.level_name(1), "b.lvl");

        let mut game = Game::new(levels, quiet()).unwrap();
        let mut frontend = HeadlessFrontend::new();
        let summary = game.run(&mut frontend).unwrap();

        assert_eq!(summary.outcome, GameOutcome::Victory);
        assert_eq!(summary.final_score, 3);
        assert_eq!(frontend.draws[0].level, "a.lvl");

        let json = serde_json::to_string(&summary).unwrap();
        let back: GameSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
