//! Game Logic Module
//!
//! All simulation code. Deterministic given the level text, the input
//! sequence and the session seed.
//!
//! ## Module Structure
//!
//! - `command`: Movement commands and key mapping
//! - `script`: Cyclic per-entity move scripts
//! - `state`: Board, pacman and ghost state
//! - `events`: Game events for logging and replay
//! - `movement`: Rules for one entity and one command
//! - `turn`: One frame, pacman then every ghost
//! - `loader`: Level files to boards
//! - `progression`: Level sequencing and game outcome

pub mod command;
pub mod script;
pub mod state;
pub mod events;
pub mod movement;
pub mod turn;
pub mod loader;
pub mod progression;

// Re-export key types
pub use command::{Command, CommandKind};
pub use script::MoveScript;
pub use state::{Board, EntityKind, Ghost, Pacman, PICKUP_POINTS};
pub use events::{GameEvent, GameEventData};
pub use movement::{resolve, MoveOutcome};
pub use turn::{play_frame, FrameOutcome, FrameResult};
pub use loader::{discover_levels, load_level, parse_level, LoadError};
pub use progression::{
    Game, GameError, GameOutcome, GameOverReason, GameSummary, InlineLevels, LevelFiles,
    LevelSource, Phase,
};
