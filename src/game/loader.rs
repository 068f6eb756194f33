//! Level Loading
//!
//! Turns a level description into a fresh `Board`.
//!
//! ## Format
//!
//! ```text
//! # comment
//! DIM <rows> <cols>
//! TEMPO <ms>              optional, default 0
//! PACMAN <row> <col>      following move lines belong to this pacman
//! GHOST <row> <col>       following move lines belong to this ghost
//! <W|A|S|D|R|Q> [count]   one scripted command, count defaults to 1
//! GRID                    then exactly <rows> lines of <cols> cells
//! ```
//!
//! Cells: `X` wall, `.` floor, `o` pickup, `@` portal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::grid::{Cell, Grid, Position};
use crate::core::rng::derive_level_seed;
use crate::game::command::{Command, CommandKind};
use crate::game::script::MoveScript;
use crate::game::state::{Board, EntityKind};

/// Level file extension picked up by `discover_levels`.
pub const LEVEL_EXTENSION: &str = "lvl";

/// Largest grid a level may declare, in cells.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Errors that make a level unplayable.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Level file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: unknown directive '{directive}'")]
    UnknownDirective { line: usize, directive: String },

    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Level index outside the level list.
    #[error("no level at index {index}")]
    NoSuchLevel { index: usize },

    #[error("line {line}: move listed before any PACMAN or GHOST")]
    MoveBeforeEntity { line: usize },

    #[error("line {line}: ghost scripts cannot contain quit")]
    QuitInGhostScript { line: usize },

    #[error("GRID section requires a DIM directive first")]
    MissingDimensions,

    #[error("level has no GRID section")]
    MissingGrid,

    #[error("grid has {found} rows, expected {expected}")]
    RowCount { expected: usize, found: usize },

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RowWidth { row: usize, expected: usize, found: usize },

    #[error("grid row {row}, column {col}: unknown cell '{mark}'")]
    UnknownCell { row: usize, col: usize, mark: char },

    #[error("line {line}: unexpected content after the grid")]
    TrailingContent { line: usize },

    #[error("{kind:?} start ({row}, {col}) is outside the grid")]
    StartOutOfBounds { kind: EntityKind, row: usize, col: usize },

    #[error("{kind:?} start ({row}, {col}) is a wall")]
    StartOnWall { kind: EntityKind, row: usize, col: usize },

    #[error("pacman and ghost {ghost} both start at ({row}, {col})")]
    OverlappingStart { ghost: usize, row: usize, col: usize },

    /// Ghosts cannot be driven by input, so they need a script.
    #[error("ghost {ghost} (line {line}) has no scripted moves")]
    GhostWithoutMoves { ghost: usize, line: usize },
}

/// Entity declaration collected while parsing.
struct EntityDecl {
    kind: EntityKind,
    start: Position,
    line: usize,
    moves: Vec<Command>,
}

/// Read and parse a level file. The board is named after the file name.
pub fn load_level(path: &Path) -> Result<Board, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_level(&name, &text)
}

/// Parse a level description into a fresh board.
pub fn parse_level(name: &str, text: &str) -> Result<Board, LoadError> {
    let mut dims: Option<(usize, usize)> = None;
    let mut tempo_ms = 0u64;
    let mut entities: Vec<EntityDecl> = Vec::new();
    let mut grid_rows: Option<Vec<&str>> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;

        if let Some(rows) = grid_rows.as_mut() {
            let expected = dims.map(|(r, _)| r).unwrap_or(0);
            if rows.len() < expected {
                rows.push(raw.trim_end_matches('\r'));
                continue;
            }
            let rest = raw.trim();
            if rest.is_empty() || rest.starts_with('#') {
                continue;
            }
            return Err(LoadError::TrailingContent { line });
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match tokens[0].to_ascii_uppercase().as_str() {
            "DIM" => {
                expect_args(&tokens, 2, line)?;
                let rows = parse_number(tokens[1], line)?;
                let cols = parse_number(tokens[2], line)?;
                if rows == 0 || cols == 0 {
                    return Err(LoadError::Malformed {
                        line,
                        reason: "grid dimensions must be positive".to_string(),
                    });
                }
                match rows.checked_mul(cols) {
                    Some(cells) if cells <= MAX_GRID_CELLS => {}
                    _ => {
                        return Err(LoadError::Malformed {
                            line,
                            reason: format!("grid {rows}x{cols} exceeds {MAX_GRID_CELLS} cells"),
                        })
                    }
                }
                dims = Some((rows, cols));
            }
            "TEMPO" => {
                expect_args(&tokens, 1, line)?;
                tempo_ms = parse_number(tokens[1], line)? as u64;
            }
            "PACMAN" | "GHOST" => {
                expect_args(&tokens, 2, line)?;
                let kind = if tokens[0].eq_ignore_ascii_case("PACMAN") {
                    EntityKind::Pacman
                } else {
                    EntityKind::Ghost
                };
                let start = Position::new(
                    parse_number(tokens[1], line)?,
                    parse_number(tokens[2], line)?,
                );
                entities.push(EntityDecl { kind, start, line, moves: Vec::new() });
            }
            "GRID" => {
                if dims.is_none() {
                    return Err(LoadError::MissingDimensions);
                }
                grid_rows = Some(Vec::new());
            }
            word => {
                let command = parse_move(&tokens, line)
                    .ok_or_else(|| LoadError::UnknownDirective {
                        line,
                        directive: word.to_string(),
                    })??;
                let entity = entities
                    .last_mut()
                    .ok_or(LoadError::MoveBeforeEntity { line })?;
                if entity.kind == EntityKind::Ghost && command.is_quit() {
                    return Err(LoadError::QuitInGhostScript { line });
                }
                entity.moves.push(command);
            }
        }
    }

    let rows = grid_rows.ok_or(LoadError::MissingGrid)?;
    let (n_rows, n_cols) = dims.ok_or(LoadError::MissingDimensions)?;
    let grid = build_grid(&rows, n_rows, n_cols)?;

    let mut board = Board::new(name, grid, tempo_ms);
    board.reseed(derive_level_seed(0, name));

    for decl in entities {
        validate_start(&board.grid, decl.kind, decl.start)?;
        match decl.kind {
            EntityKind::Pacman => {
                board.add_pacman(decl.start, MoveScript::new(decl.moves));
            }
            EntityKind::Ghost => {
                if decl.moves.is_empty() {
                    return Err(LoadError::GhostWithoutMoves {
                        ghost: board.ghosts.len(),
                        line: decl.line,
                    });
                }
                board.add_ghost(decl.start, MoveScript::new(decl.moves));
            }
        }
    }

    if let Some(pacman) = board.pacmans.first() {
        if let Some(ghost) = board.ghost_at(pacman.position, None) {
            return Err(LoadError::OverlappingStart {
                ghost,
                row: pacman.position.row,
                col: pacman.position.col,
            });
        }
    }

    info!(
        level = name,
        rows = n_rows,
        cols = n_cols,
        pacmans = board.pacmans.len(),
        ghosts = board.ghosts.len(),
        pickups = board.grid.pickups_remaining(),
        tempo_ms,
        "level loaded"
    );

    Ok(board)
}

/// Parse a move line, `None` if the first token is not a move letter.
fn parse_move(tokens: &[&str], line: usize) -> Option<Result<Command, LoadError>> {
    let mut letters = tokens[0].chars();
    let letter = letters.next()?;
    if letters.next().is_some() {
        return None;
    }
    let kind = Command::kind_from_letter(letter)?;

    let turns = match tokens.get(1) {
        None => 1,
        Some(raw) => match parse_number(raw, line) {
            Ok(0) => {
                return Some(Err(LoadError::Malformed {
                    line,
                    reason: "move count must be at least 1".to_string(),
                }))
            }
            Ok(n) => match u32::try_from(n) {
                Ok(n) => n,
                Err(_) => {
                    return Some(Err(LoadError::InvalidNumber {
                        line,
                        value: raw.to_string(),
                    }))
                }
            },
            Err(e) => return Some(Err(e)),
        },
    };

    if tokens.len() > 2 {
        return Some(Err(LoadError::Malformed {
            line,
            reason: format!("expected '{letter} [count]'"),
        }));
    }

    // Quit never repeats
    let turns = if kind == CommandKind::Quit { 1 } else { turns };
    Some(Ok(Command { kind, turns }))
}

fn expect_args(tokens: &[&str], count: usize, line: usize) -> Result<(), LoadError> {
    if tokens.len() != count + 1 {
        return Err(LoadError::Malformed {
            line,
            reason: format!("{} expects {} argument(s)", tokens[0], count),
        });
    }
    Ok(())
}

fn parse_number(raw: &str, line: usize) -> Result<usize, LoadError> {
    raw.parse::<usize>().map_err(|_| LoadError::InvalidNumber {
        line,
        value: raw.to_string(),
    })
}

fn build_grid(rows: &[&str], n_rows: usize, n_cols: usize) -> Result<Grid, LoadError> {
    if rows.len() != n_rows {
        return Err(LoadError::RowCount {
            expected: n_rows,
            found: rows.len(),
        });
    }

    let mut cells = Vec::with_capacity(n_rows * n_cols);
    for (row, text) in rows.iter().enumerate() {
        let found = text.chars().count();
        if found != n_cols {
            return Err(LoadError::RowWidth {
                row,
                expected: n_cols,
                found,
            });
        }
        for (col, mark) in text.chars().enumerate() {
            let cell = Cell::from_mark(mark).ok_or(LoadError::UnknownCell { row, col, mark })?;
            cells.push(cell);
        }
    }

    Grid::from_cells(n_rows, n_cols, cells).ok_or(LoadError::RowCount {
        expected: n_rows,
        found: rows.len(),
    })
}

fn validate_start(grid: &Grid, kind: EntityKind, start: Position) -> Result<(), LoadError> {
    let Position { row, col } = start;
    match grid.get(start) {
        None => Err(LoadError::StartOutOfBounds { kind, row, col }),
        Some(Cell::Wall) => Err(LoadError::StartOnWall { kind, row, col }),
        Some(_) => Ok(()),
    }
}

/// List `*.lvl` files in `dir`, sorted lexically by file name.
pub fn discover_levels(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut levels: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == LEVEL_EXTENSION))
        .collect();

    levels.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = levels.len(), "levels discovered");
    Ok(levels)
}

// =============================================================================
// TESTS
// =============================================================================
