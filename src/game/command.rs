//! Movement Commands
//!
//! A command is what drives an entity for one frame: a direction, a
//! random direction, or the quit request. Scripted commands carry a
//! repeat count; interactive ones always have `turns == 1`.

use serde::{Serialize, Deserialize};

use crate::core::grid::Direction;

/// What a command asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Move in a fixed direction.
    Move(Direction),
    /// Move in a direction drawn from the board RNG at resolution time.
    Random,
    /// End the game immediately.
    Quit,
}

/// A command with its run-length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    /// Number of single-cell steps, always at least 1.
    pub turns: u32,
}

impl Command {
    /// One step in `direction`.
    pub const fn step(direction: Direction) -> Self {
        Self::repeated(direction, 1)
    }

    /// `turns` steps in `direction`.
    pub const fn repeated(direction: Direction, turns: u32) -> Self {
        Self {
            kind: CommandKind::Move(direction),
            turns,
        }
    }

    pub const fn random(turns: u32) -> Self {
        Self {
            kind: CommandKind::Random,
            turns,
        }
    }

    pub const fn quit() -> Self {
        Self {
            kind: CommandKind::Quit,
            turns: 1,
        }
    }

    #[inline]
    pub fn is_quit(&self) -> bool {
        self.kind == CommandKind::Quit
    }

    /// Parse a script or key letter: `W A S D` move, `R` random, `Q` quit.
    ///
    /// Case-insensitive so interactive keys work without shift.
    pub fn kind_from_letter(letter: char) -> Option<CommandKind> {
        match letter.to_ascii_uppercase() {
            'W' => Some(CommandKind::Move(Direction::Up)),
            'A' => Some(CommandKind::Move(Direction::Left)),
            'S' => Some(CommandKind::Move(Direction::Down)),
            'D' => Some(CommandKind::Move(Direction::Right)),
            'R' => Some(CommandKind::Random),
            'Q' => Some(CommandKind::Quit),
            _ => None,
        }
    }

    /// Interactive key press to command (`turns == 1`).
    pub fn from_key(key: char) -> Option<Self> {
        Self::kind_from_letter(key).map(|kind| Self { kind, turns: 1 })
    }

    /// Letter used for this command in logs and level files.
    pub fn letter(&self) -> char {
        match self.kind {
            CommandKind::Move(Direction::Up) => 'W',
            CommandKind::Move(Direction::Left) => 'A',
            CommandKind::Move(Direction::Down) => 'S',
            CommandKind::Move(Direction::Right) => 'D',
            CommandKind::Random => 'R',
            CommandKind::Quit => 'Q',
        }
    }
}
