//! Headless Frontend
//!
//! Feeds queued commands and records what would have been shown. Once the
//! queue runs dry every request answers quit, so interactive levels end
//! instead of waiting forever.

use std::collections::VecDeque;
use std::io;

use crate::game::command::Command;
use crate::game::state::Board;

use super::{DrawMode, InputSource, Pacer, RenderSink};

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawRecord {
    pub level: String,
    pub mode: DrawMode,
    pub frame: u64,
    pub score: u32,
}

/// Frontend without a terminal.
#[derive(Debug, Default)]
pub struct HeadlessFrontend {
    inputs: VecDeque<Command>,
    /// Every draw call, in order
    pub draws: Vec<DrawRecord>,
    /// Every pause request in milliseconds, in order
    pub pauses: Vec<u64>,
    /// Number of flushes
    pub flushes: usize,
}

impl HeadlessFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frontend that answers `inputs` in order, then quit.
    pub fn with_inputs(inputs: impl IntoIterator<Item = Command>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Draw modes seen so far.
    pub fn modes(&self) -> Vec<DrawMode> {
        self.draws.iter().map(|d| d.mode).collect()
    }

    /// Total requested pause time.
    pub fn paused_ms(&self) -> u64 {
        self.pauses.iter().sum()
    }
}

impl RenderSink for HeadlessFrontend {
    fn draw(&mut self, board: &Board, mode: DrawMode) -> io::Result<()> {
        self.draws.push(DrawRecord {
            level: board.name.clone(),
            mode,
            frame: board.frame,
            score: board.score(),
        });
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl InputSource for HeadlessFrontend {
    fn next_command(&mut self) -> Option<Command> {
        Some(self.inputs.pop_front().unwrap_or_else(Command::quit))
    }
}

impl Pacer for HeadlessFrontend {
    fn pause(&mut self, ms: u64) {
        self.pauses.push(ms);
    }
}
