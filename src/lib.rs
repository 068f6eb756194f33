//! # pacterm
//!
//! Terminal Pac-Man: hand-authored levels, scripted or interactive pacman,
//! ghosts on fixed move scripts, score carried from level to level.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          PACTERM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  ├── grid.rs       - Cells, positions, directions            │
//! │  ├── rng.rs        - Seeded Xorshift128+ PRNG                │
//! │  └── hash.rs       - SHA-256 board state hashing             │
//! │                                                              │
//! │  game/             - Simulation (deterministic)              │
//! │  ├── command.rs    - Movement commands                       │
//! │  ├── script.rs     - Cyclic move scripts                     │
//! │  ├── state.rs      - Board and entities                      │
//! │  ├── movement.rs   - Wall, pickup, portal, collision rules   │
//! │  ├── turn.rs       - One frame                               │
//! │  ├── loader.rs     - Level files                             │
//! │  └── progression.rs- Level sequencing                        │
//! │                                                              │
//! │  frontend/         - Outside world (non-deterministic)       │
//! │  ├── terminal.rs   - crossterm play                          │
//! │  └── headless.rs   - Queued input, recorded output           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Given the same level text, input sequence and seed, `core/` and `game/`
//! produce identical boards and state hashes. Display pacing never feeds
//! back into the simulation.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod frontend;
pub mod game;

// Re-export commonly used types
pub use config::GameConfig;
pub use core::grid::{Cell, Direction, Grid, Position};
pub use core::rng::DeterministicRng;
pub use game::command::Command;
pub use game::progression::{Game, GameError, GameSummary, Phase};
pub use game::state::Board;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
