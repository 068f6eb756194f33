//! Cyclic Move Scripts
//!
//! A script is a fixed list of commands replayed forever. The cursor is a
//! monotonically increasing counter; the command it designates is
//! `moves[cursor % moves.len()]`, so the script loops without a reset.

use serde::{Serialize, Deserialize};

use crate::game::command::Command;

/// Pre-authored command sequence plus its cyclic cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveScript {
    moves: Vec<Command>,
    cursor: u64,
}

impl MoveScript {
    pub fn new(moves: Vec<Command>) -> Self {
        Self { moves, cursor: 0 }
    }

    /// An empty script (entity driven by interactive input).
    pub fn interactive() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn moves(&self) -> &[Command] {
        &self.moves
    }

    /// Total commands handed out so far. Never decreases.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Command the cursor currently designates, without advancing.
    pub fn peek(&self) -> Option<Command> {
        if self.moves.is_empty() {
            return None;
        }
        let slot = (self.cursor % self.moves.len() as u64) as usize;
        Some(self.moves[slot])
    }

    /// Return the current command and advance the cursor by one.
    ///
    /// After the last command the script starts over from the first.
    /// An empty script yields `None` and leaves the cursor untouched.
    pub fn next_command(&mut self) -> Option<Command> {
        let command = self.peek()?;
        self.cursor += 1;
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Direction;

    #[test]
    fn test_empty_script_yields_nothing() {
        let mut script = MoveScript::interactive();
        assert!(script.is_empty());
        assert_eq!(script.next_command(), None);
        assert_eq!(script.cursor(), 0);
    }

    #[test]
    fn test_script_wraps() {
        let mut script = MoveScript::new(vec![
            Command::step(Direction::Left),
            Command::repeated(Direction::Right, 2),
        ]);

        let taken: Vec<_> = (0..5).map(|_| script.next_command().unwrap()).collect();
        assert_eq!(taken[0], taken[2]);
        assert_eq!(taken[2], taken[4]);
        assert_eq!(taken[1], taken[3]);
        assert_eq!(taken[1].turns, 2);
        assert_eq!(script.cursor(), 5);
        assert_eq!(script.peek(), Some(taken[1]));
    }
}
