//! Game Events
//!
//! Events generated while resolving a frame. They feed the diagnostic log
//! and the replay summary; they never drive the simulation.

use serde::{Serialize, Deserialize};

use crate::core::grid::Position;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Pacman consumed a pickup
    PickupConsumed {
        pacman: usize,
        position: Position,
        points: u32,
        new_score: u32,
    },

    /// Pacman and a ghost ended up on the same cell
    PacmanKilled {
        pacman: usize,
        ghost: usize,
        position: Position,
    },

    /// Pacman stepped onto a portal
    PortalReached {
        pacman: usize,
        position: Position,
    },

    /// A quit command was issued
    QuitRequested,
}

/// A game event stamped with the frame it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame counter of the board when the event occurred
    pub frame: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    pub fn new(frame: u64, data: GameEventData) -> Self {
        Self { frame, data }
    }

    /// Create pickup consumed event.
    pub fn pickup_consumed(
        frame: u64,
        pacman: usize,
        position: Position,
        points: u32,
        new_score: u32,
    ) -> Self {
        Self::new(
            frame,
            GameEventData::PickupConsumed {
                pacman,
                position,
                points,
                new_score,
            },
        )
    }

    /// Create pacman killed event.
    pub fn pacman_killed(frame: u64, pacman: usize, ghost: usize, position: Position) -> Self {
        Self::new(frame, GameEventData::PacmanKilled { pacman, ghost, position })
    }

    /// Create portal reached event.
    pub fn portal_reached(frame: u64, pacman: usize, position: Position) -> Self {
        Self::new(frame, GameEventData::PortalReached { pacman, position })
    }

    pub fn quit_requested(frame: u64) -> Self {
        Self::new(frame, GameEventData::QuitRequested)
    }

    /// True for events that end the level.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.data, GameEventData::PickupConsumed { .. })
    }
}
