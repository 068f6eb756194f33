//! Board State Definitions
//!
//! All state for one level in play. A board is built in one shot by the
//! loader, mutated frame by frame, and dropped when the level ends.

use serde::{Serialize, Deserialize};

use crate::core::grid::{Grid, Position};
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::events::GameEvent;
use crate::game::script::MoveScript;

/// Points awarded for consuming one pickup.
pub const PICKUP_POINTS: u32 = 1;

// =============================================================================
// ENTITIES
// =============================================================================

/// Which entity list an index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Pacman,
    Ghost,
}

/// A pacman on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacman {
    /// Current cell
    pub position: Position,

    /// Cleared when a ghost shares its cell
    pub alive: bool,

    /// Scripted moves; empty means interactive control
    pub script: MoveScript,

    /// Accumulated points (carried across levels by the progression)
    pub points: u32,
}

impl Pacman {
    pub fn new(position: Position, script: MoveScript) -> Self {
        Self {
            position,
            alive: true,
            script,
            points: 0,
        }
    }

    /// True when this pacman reads interactive input instead of a script.
    #[inline]
    pub fn is_interactive(&self) -> bool {
        self.script.is_empty()
    }

    /// Add points, saturating.
    pub fn add_points(&mut self, amount: u32) -> u32 {
        self.points = self.points.saturating_add(amount);
        self.points
    }

    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_position(self.position);
        hasher.update_bool(self.alive);
        hasher.update_u64(self.script.cursor());
        hasher.update_u32(self.points);
    }
}

/// A ghost on the board. Always scripted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ghost {
    /// Current cell
    pub position: Position,

    pub alive: bool,

    /// Scripted moves, never empty on a loaded board
    pub script: MoveScript,
}

impl Ghost {
    pub fn new(position: Position, script: MoveScript) -> Self {
        Self {
            position,
            alive: true,
            script,
        }
    }

    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_position(self.position);
        hasher.update_bool(self.alive);
        hasher.update_u64(self.script.cursor());
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Complete state of one level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    /// Level name (file name for loaded levels)
    pub name: String,

    /// Static geometry; only pickup consumption mutates it
    pub grid: Grid,

    /// Pacmans in index order
    pub pacmans: Vec<Pacman>,

    /// Ghosts in index order (resolution order)
    pub ghosts: Vec<Ghost>,

    /// Delay after each rendered frame, for human pacing only
    pub tempo_ms: u64,

    /// Frames resolved so far on this board
    pub frame: u64,

    /// RNG for random script moves
    pub rng: DeterministicRng,

    /// Events generated this frame (cleared each frame)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl Board {
    /// Create a board with no entities.
    pub fn new(name: impl Into<String>, grid: Grid, tempo_ms: u64) -> Self {
        Self {
            name: name.into(),
            grid,
            pacmans: Vec::new(),
            ghosts: Vec::new(),
            tempo_ms,
            frame: 0,
            rng: DeterministicRng::default(),
            pending_events: Vec::new(),
        }
    }

    /// Add a pacman, returning its index.
    pub fn add_pacman(&mut self, position: Position, script: MoveScript) -> usize {
        self.pacmans.push(Pacman::new(position, script));
        self.pacmans.len() - 1
    }

    /// Add a ghost, returning its index.
    pub fn add_ghost(&mut self, position: Position, script: MoveScript) -> usize {
        self.ghosts.push(Ghost::new(position, script));
        self.ghosts.len() - 1
    }

    /// Reset the random move source.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = DeterministicRng::new(seed);
    }

    /// Accumulated score of the level (points of pacman 0).
    pub fn score(&self) -> u32 {
        self.pacmans.first().map(|p| p.points).unwrap_or(0)
    }

    /// Carry points from the previous level into pacman 0.
    pub fn carry_points(&mut self, points: u32) {
        if let Some(pacman) = self.pacmans.first_mut() {
            pacman.points = points;
        }
    }

    /// True while pacman 0 exists and is alive.
    pub fn pacman_alive(&self) -> bool {
        self.pacmans.first().is_some_and(|p| p.alive)
    }

    /// Index of the first ghost on `pos`, skipping `except`.
    pub fn ghost_at(&self, pos: Position, except: Option<usize>) -> Option<usize> {
        self.ghosts
            .iter()
            .enumerate()
            .find(|(i, g)| Some(*i) != except && g.alive && g.position == pos)
            .map(|(i, _)| i)
    }

    /// Index of the first live pacman on `pos`.
    pub fn pacman_at(&self, pos: Position) -> Option<usize> {
        self.pacmans
            .iter()
            .position(|p| p.alive && p.position == pos)
    }

    /// Compute hash of current state for replay verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame, &self.grid, |hasher| {
            for pacman in &self.pacmans {
                pacman.hash_into(hasher);
            }
            for ghost in &self.ghosts {
                ghost.hash_into(hasher);
            }
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{Cell, Direction};
    use crate::game::command::Command;

    fn open_board() -> Board {
        Board::new("test", Grid::filled(3, 3, Cell::Floor), 0)
    }

    #[test]
    fn test_carry_points_targets_first_pacman() {
        let mut board = open_board();
        assert_eq!(board.score(), 0);

        // No pacman: nothing to carry into
        board.carry_points(9);
        assert_eq!(board.score(), 0);

        board.add_pacman(Position::new(1, 1), MoveScript::interactive());
        board.carry_points(9);
        assert_eq!(board.score(), 9);
        assert!(board.pacmans[0].is_interactive());
    }

    #[test]
    fn test_ghost_lookup_skips_self() {
        let mut board = open_board();
        let script = MoveScript::new(vec![Command::step(Direction::Up)]);
        board.add_ghost(Position::new(0, 0), script.clone());
        board.add_ghost(Position::new(0, 0), script);

        assert_eq!(board.ghost_at(Position::new(0, 0), None), Some(0));
        assert_eq!(board.ghost_at(Position::new(0, 0), Some(0)), Some(1));
        assert_eq!(board.ghost_at(Position::new(2, 2), None), None);
    }

    #[test]
    fn test_hash_tracks_entities() {
        let mut board1 = open_board();
        let mut board2 = open_board();
        board1.add_pacman(Position::new(1, 1), MoveScript::interactive());
        board2.add_pacman(Position::new(1, 1), MoveScript::interactive());
        assert_eq!(board1.compute_hash(), board2.compute_hash());

        board2.pacmans[0].position = Position::new(1, 2);
        assert_ne!(board1.compute_hash(), board2.compute_hash());
    }

    #[test]
    fn test_events_are_drained() {
        let mut board = open_board();
        board.push_event(GameEvent::quit_requested(0));
        assert_eq!(board.take_events().len(), 1);
        assert!(board.take_events().is_empty());
    }
}
