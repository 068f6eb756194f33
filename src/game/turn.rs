//! Frame Coordination
//!
//! One frame: pacman's command is resolved first, then every ghost in
//! index order. The frame outcome tells the progression whether to keep
//! playing, advance to the next level, or end the game.

use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::game::command::{Command, CommandKind};
use crate::game::events::GameEvent;
use crate::game::movement::{resolve, MoveOutcome};
use crate::game::state::{Board, EntityKind};

/// What the frame means for the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOutcome {
    /// Keep playing this level
    ContinuePlay,
    /// Pacman reached the portal
    NextLevel,
    /// Quit requested or pacman died
    QuitGame,
}

/// Result of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameResult {
    pub outcome: FrameOutcome,
    /// Pacman's resolution, `None` when no command was available
    pub pacman_move: Option<MoveOutcome>,
    /// Events generated this frame
    pub events: Vec<GameEvent>,
}

impl FrameResult {
    fn idle() -> Self {
        Self {
            outcome: FrameOutcome::ContinuePlay,
            pacman_move: None,
            events: Vec::new(),
        }
    }
}

/// Pick pacman's command for this frame.
///
/// A scripted pacman always gets its next script command (the cursor
/// advances and wraps). An interactive pacman asks `input`, which may
/// return `None` for "nothing this frame".
fn pacman_command<I>(board: &mut Board, input: &mut I) -> Option<Command>
where
    I: FnMut() -> Option<Command>,
{
    match board.pacmans.first_mut() {
        Some(pacman) if !pacman.is_interactive() => pacman.script.next_command(),
        _ => input(),
    }
}

/// Run one frame.
///
/// `input` is only consulted when pacman has no script (or the level has
/// no pacman at all). The board's frame counter advances on every frame
/// that actually resolves a command.
pub fn play_frame<I>(board: &mut Board, mut input: I) -> FrameResult
where
    I: FnMut() -> Option<Command>,
{
    // 1. Pacman's command; no input means nothing moves this frame
    let Some(command) = pacman_command(board, &mut input) else {
        return FrameResult::idle();
    };

    board.frame += 1;
    trace!(frame = board.frame, key = %command.letter(), turns = command.turns, "frame command");

    // 2. Quit
    if command.is_quit() {
        board.push_event(GameEvent::quit_requested(board.frame));
        debug!(frame = board.frame, "quit requested");
        return finish(board, FrameOutcome::QuitGame, Some(MoveOutcome::QuitRequested));
    }

    // 3. Pacman
    let pacman_move = if board.pacmans.is_empty() {
        None
    } else {
        let outcome = resolve(board, EntityKind::Pacman, 0, command);
        match outcome {
            MoveOutcome::ReachedPortal => {
                return finish(board, FrameOutcome::NextLevel, Some(outcome));
            }
            MoveOutcome::Dead => {
                return finish(board, FrameOutcome::QuitGame, Some(outcome));
            }
            _ => Some(outcome),
        }
    };

    // 4. Ghosts, in index order
    move_ghosts(board);

    // 5. A ghost may have just caught pacman
    let outcome = if board.pacmans.is_empty() || board.pacman_alive() {
        FrameOutcome::ContinuePlay
    } else {
        FrameOutcome::QuitGame
    };

    finish(board, outcome, pacman_move)
}

/// Resolve every ghost's next scripted command.
fn move_ghosts(board: &mut Board) {
    for index in 0..board.ghosts.len() {
        let Some(command) = board.ghosts[index].script.next_command() else {
            continue;
        };
        // Loader rejects quit in ghost scripts
        if command.kind == CommandKind::Quit {
            continue;
        }
        let outcome = resolve(board, EntityKind::Ghost, index, command);
        trace!(ghost = index, ?outcome, "ghost moved");
    }
}

fn finish(board: &mut Board, outcome: FrameOutcome, pacman_move: Option<MoveOutcome>) -> FrameResult {
    if outcome != FrameOutcome::ContinuePlay {
        debug!(frame = board.frame, ?outcome, score = board.score(), "level ending frame");
    }
    FrameResult {
        outcome,
        pacman_move,
        events: board.take_events(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{Direction, Position};
    use crate::game::loader::parse_level;
    use crate::game::events::GameEventData;

    fn no_input() -> Option<Command> {
        None
    }

    #[test]
    fn test_ghost_closes_gap() {
        // No pickups, no portal, ghost two cells right of pacman
        let mut board = parse_level(
            "chase",
            "DIM 3 6\n\
             PACMAN 1 1\n\
             S 1\n\
             GHOST 1 3\n\
             A 1\n\
             GRID\n\
             XXXXXX\n\
             X....X\n\
             XXXXXX\n",
        )
        .unwrap();

        // Pacman is blocked (wall below), ghost steps to col 2
        let first = play_frame(&mut board, no_input);
        assert_eq!(first.outcome, FrameOutcome::ContinuePlay);
        assert_eq!(first.pacman_move, Some(MoveOutcome::Blocked));
        assert_eq!(board.ghosts[0].position, Position::new(1, 2));

        // Ghost steps onto pacman
        let second = play_frame(&mut board, no_input);
        assert_eq!(second.outcome, FrameOutcome::QuitGame);
        assert!(!board.pacmans[0].alive);
        assert!(second
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::PacmanKilled { .. })));
    }

    #[test]
    fn test_scripted_portal_next_frame() {
        let mut board = parse_level(
            "portal",
            "DIM 3 5\n\
             PACMAN 1 1\n\
             D 1\n\
             GHOST 1 3\n\
             D 1\n\
             GRID\n\
             XXXXX\n\
             X.@.X\n\
             XXXXX\n",
        )
        .unwrap();

        let result = play_frame(&mut board, no_input);
        assert_eq!(result.outcome, FrameOutcome::NextLevel);
        // Ghosts do not move on the exit frame
        assert_eq!(board.ghosts[0].position, Position::new(1, 3));
        assert_eq!(board.ghosts[0].script.cursor(), 0);
    }

    #[test]
    fn test_no_input_freezes_frame() {
        let mut board = parse_level(
            "idle",
            "DIM 3 5\n\
             PACMAN 1 1\n\
             GHOST 1 3\n\
             A 1\n\
             GRID\n\
             XXXXX\n\
             X...X\n\
             XXXXX\n",
        )
        .unwrap();
        let before = board.compute_hash();

        let result = play_frame(&mut board, no_input);
        assert_eq!(result.outcome, FrameOutcome::ContinuePlay);
        assert_eq!(result.pacman_move, None);
        assert_eq!(board.compute_hash(), before);
        assert_eq!(board.frame, 0);
    }

    #[test]
    fn test_interactive_quit() {
        let mut board = parse_level(
            "quit",
            "DIM 3 5\nPACMAN 1 1\nGRID\nXXXXX\nX...X\nXXXXX\n",
        )
        .unwrap();

        let result = play_frame(&mut board, || Some(Command::quit()));
        assert_eq!(result.outcome, FrameOutcome::QuitGame);
        assert_eq!(result.pacman_move, Some(MoveOutcome::QuitRequested));
        assert_eq!(result.events, vec![GameEvent::quit_requested(1)]);
    }

    #[test]
    fn test_scripted_quit() {
        let mut board = parse_level(
            "scripted quit",
            "DIM 3 5\nPACMAN 1 1\nD 1\nQ\nGRID\nXXXXX\nX...X\nXXXXX\n",
        )
        .unwrap();

        assert_eq!(play_frame(&mut board, no_input).outcome, FrameOutcome::ContinuePlay);
        assert_eq!(play_frame(&mut board, no_input).outcome, FrameOutcome::QuitGame);
    }

    #[test]
    fn test_ghosts_move_in_index_order() {
        // Ghost 0 takes the only free cell first; ghost 1 is then blocked
        let mut board = parse_level(
            "order",
            "DIM 3 6\n\
             PACMAN 1 1\n\
             A 1\n\
             GHOST 1 2\n\
             D 1\n\
             GHOST 1 4\n\
             A 1\n\
             GRID\n\
             XXXXXX\n\
             X....X\n\
             XXXXXX\n",
        )
        .unwrap();

        play_frame(&mut board, no_input);
        assert_eq!(board.ghosts[0].position, Position::new(1, 3));
        assert_eq!(board.ghosts[1].position, Position::new(1, 4));
    }

    #[test]
    fn test_replay_determinism() {
        let text = "DIM 5 7\n\
                    TEMPO 40\n\
                    PACMAN 1 1\n\
                    D 2\nS 2\nR 1\nA 1\n\
                    GHOST 3 5\n\
                    R 2\nW 1\n\
                    GHOST 1 5\n\
                    S 1\nA 3\n\
                    GRID\n\
                    XXXXXXX\n\
                    X.oo..X\n\
                    X.X.X.X\n\
                    Xo...oX\n\
                    XXXXXXX\n";

        let run = || {
            let mut board = parse_level("replay", text).unwrap();
            board.reseed(99);
            let mut trace = Vec::new();
            for _ in 0..40 {
                let result = play_frame(&mut board, no_input);
                trace.push((result.outcome, board.compute_hash()));
                if result.outcome != FrameOutcome::ContinuePlay {
                    break;
                }
            }
            trace
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_level_without_pacman_moves_ghosts_on_input() {
        let mut board = parse_level(
            "ghosts only",
            "DIM 3 5\nGHOST 1 3\nA 1\nGRID\nXXXXX\nX...X\nXXXXX\n",
        )
        .unwrap();

        let result = play_frame(&mut board, || Some(Command::step(Direction::Up)));
        assert_eq!(result.outcome, FrameOutcome::ContinuePlay);
        assert_eq!(result.pacman_move, None);
        assert_eq!(board.ghosts[0].position, Position::new(1, 2));

        assert_eq!(play_frame(&mut board, no_input).outcome, FrameOutcome::ContinuePlay);
        assert_eq!(board.ghosts[0].position, Position::new(1, 2));
    }
}
