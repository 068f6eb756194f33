//! Core deterministic primitives.
//!
//! Grid geometry, seeded randomness and state hashing. Nothing here
//! knows about pacmans, ghosts or levels.

pub mod grid;
pub mod rng;
pub mod hash;

// Re-export core types
pub use grid::{Cell, Direction, Grid, Position};
pub use rng::DeterministicRng;
pub use hash::{StateHash, compute_state_hash};
