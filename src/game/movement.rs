//! Movement Resolution
//!
//! Applies one command to one entity and reports what happened.
//! Walls, pickups, portals and pacman/ghost collisions are all decided
//! here; everything is an outcome value, nothing here fails.

use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::core::grid::{Cell, Direction, Position};
use crate::game::command::{Command, CommandKind};
use crate::game::events::GameEvent;
use crate::game::state::{Board, EntityKind, PICKUP_POINTS};

/// Result of resolving one command for one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Entity moved at least one cell
    Moved,
    /// First step hit a wall; entity did not move
    Blocked,
    /// Pacman consumed pickups worth this many points
    PickedUp(u32),
    /// Pacman stepped onto a portal
    ReachedPortal,
    /// Ghost moved onto a pacman, killing it
    Collided,
    /// Pacman is dead (moved onto a ghost, or already dead)
    Dead,
    /// Command was a quit request; nothing moved
    QuitRequested,
}

/// Resolve `command` for entity `index` of `kind`.
///
/// A multi-turn command is applied one cell at a time and stops at the
/// first blocked step, leaving the entity on the furthest legal cell.
/// Quit short-circuits before any positional logic.
///
/// # Panics
///
/// Panics if `index` does not name an entity of `kind` on this board.
pub fn resolve(
    board: &mut Board,
    kind: EntityKind,
    index: usize,
    command: Command,
) -> MoveOutcome {
    if command.is_quit() {
        board.push_event(GameEvent::quit_requested(board.frame));
        return MoveOutcome::QuitRequested;
    }

    match kind {
        EntityKind::Pacman => resolve_pacman(board, index, command),
        EntityKind::Ghost => resolve_ghost(board, index, command),
    }
}

/// Direction a command moves in. Random commands draw once per command,
/// so every turn of a repeated random move goes the same way.
fn direction_for(board: &mut Board, command: Command) -> Option<Direction> {
    match command.kind {
        CommandKind::Move(direction) => Some(direction),
        CommandKind::Random => Some(board.rng.random_direction()),
        CommandKind::Quit => None,
    }
}

/// Next cell from `from`, if it is inside the grid and not a wall.
#[inline]
fn open_step(board: &Board, from: Position, direction: Direction) -> Option<Position> {
    from.step(direction)
        .filter(|target| board.grid.is_walkable(*target))
}

fn resolve_pacman(board: &mut Board, index: usize, command: Command) -> MoveOutcome {
    assert!(
        index < board.pacmans.len(),
        "pacman index {} out of range ({} pacmans)",
        index,
        board.pacmans.len()
    );

    if !board.pacmans[index].alive {
        return MoveOutcome::Dead;
    }

    let Some(direction) = direction_for(board, command) else {
        return MoveOutcome::QuitRequested;
    };

    let mut moved = false;
    let mut points = 0u32;

    for turn in 0..command.turns.max(1) {
        let from = board.pacmans[index].position;
        let Some(target) = open_step(board, from, direction) else {
            trace!(pacman = index, turn, ?direction, "pacman blocked");
            break;
        };

        board.pacmans[index].position = target;
        moved = true;

        // Collision first: a ghost standing on a pickup or portal still kills
        if let Some(ghost) = board.ghost_at(target, None) {
            board.pacmans[index].alive = false;
            debug!(pacman = index, ghost, row = target.row, col = target.col, "pacman ran into ghost");
            board.push_event(GameEvent::pacman_killed(board.frame, index, ghost, target));
            return MoveOutcome::Dead;
        }

        match board.grid.get(target) {
            Some(Cell::Portal) => {
                debug!(pacman = index, row = target.row, col = target.col, "portal reached");
                board.push_event(GameEvent::portal_reached(board.frame, index, target));
                return MoveOutcome::ReachedPortal;
            }
            Some(Cell::Pickup) => {
                board.grid.set(target, Cell::Floor);
                let new_score = board.pacmans[index].add_points(PICKUP_POINTS);
                points += PICKUP_POINTS;
                trace!(pacman = index, new_score, "pickup consumed");
                board.push_event(GameEvent::pickup_consumed(
                    board.frame,
                    index,
                    target,
                    PICKUP_POINTS,
                    new_score,
                ));
            }
            _ => {}
        }
    }

    if points > 0 {
        MoveOutcome::PickedUp(points)
    } else if moved {
        MoveOutcome::Moved
    } else {
        MoveOutcome::Blocked
    }
}

fn resolve_ghost(board: &mut Board, index: usize, command: Command) -> MoveOutcome {
    assert!(
        index < board.ghosts.len(),
        "ghost index {} out of range ({} ghosts)",
        index,
        board.ghosts.len()
    );

    if !board.ghosts[index].alive {
        return MoveOutcome::Blocked;
    }

    let Some(direction) = direction_for(board, command) else {
        return MoveOutcome::QuitRequested;
    };

    let mut moved = false;

    for turn in 0..command.turns.max(1) {
        let from = board.ghosts[index].position;
        // Ghosts never stack on each other
        let Some(target) = open_step(board, from, direction)
            .filter(|target| board.ghost_at(*target, Some(index)).is_none())
        else {
            trace!(ghost = index, turn, ?direction, "ghost blocked");
            break;
        };

        board.ghosts[index].position = target;
        moved = true;

        if let Some(pacman) = board.pacman_at(target) {
            board.pacmans[pacman].alive = false;
            debug!(pacman, ghost = index, row = target.row, col = target.col, "ghost caught pacman");
            board.push_event(GameEvent::pacman_killed(board.frame, pacman, index, target));
            return MoveOutcome::Collided;
        }
    }

    if moved {
        MoveOutcome::Moved
    } else {
        MoveOutcome::Blocked
    }
}

// =============================================================================
// TESTS
// =============================================================================
