//! Frontends
//!
//! The simulation never talks to a terminal directly. It draws through a
//! `RenderSink`, reads keys through an `InputSource` and paces through a
//! `Pacer`. Anything implementing all three is a `Frontend`.
//!
//! - `terminal`: crossterm frontend for interactive play
//! - `headless`: scripted frontend for tests and `--headless` replays

pub mod headless;
pub mod terminal;

use std::io;

use serde::{Serialize, Deserialize};

use crate::game::command::Command;
use crate::game::state::Board;

pub use headless::HeadlessFrontend;
pub use terminal::TerminalFrontend;

/// What screen a draw call is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawMode {
    /// Level start screen
    Menu,
    /// Regular frame
    Play,
    /// Game ended without clearing every level
    GameOver,
    /// Every level cleared
    Victory,
}

/// Receives board snapshots to display.
pub trait RenderSink {
    fn draw(&mut self, board: &Board, mode: DrawMode) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Interactive command source.
pub trait InputSource {
    /// Command for this frame, `None` when nothing was pressed.
    fn next_command(&mut self) -> Option<Command>;
}

/// Display pacing. Never affects simulation outcomes.
pub trait Pacer {
    fn pause(&mut self, ms: u64);
}

/// Everything the progression needs from the outside world.
pub trait Frontend: RenderSink + InputSource + Pacer {}

impl<T: RenderSink + InputSource + Pacer> Frontend for T {}
