//! Terminal Frontend
//!
//! crossterm-backed play: alternate screen, raw mode, non-blocking key
//! polling and one character per cell. The terminal is restored when the
//! frontend is dropped.

use std::io::{self, BufWriter, Stdout, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::{self, MoveTo};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use tracing::warn;

use crate::core::grid::{Cell, Direction, Position};
use crate::game::command::Command;
use crate::game::state::Board;

use super::{DrawMode, InputSource, Pacer, RenderSink};

const PACMAN_GLYPH: char = 'C';
const DEAD_GLYPH: char = '+';
const GHOST_GLYPH: char = 'M';

/// Interactive terminal frontend.
pub struct TerminalFrontend {
    writer: BufWriter<Stdout>,
    active: bool,
}

impl TerminalFrontend {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> io::Result<Self> {
        let mut writer = BufWriter::with_capacity(16384, io::stdout());
        terminal::enable_raw_mode()?;
        execute!(
            writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        Ok(Self { writer, active: true })
    }

    /// Leave the alternate screen and raw mode. Idempotent.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn glyph_at(board: &Board, pos: Position, cell: Cell) -> (char, Color) {
        if board.pacman_at(pos).is_some() {
            return (PACMAN_GLYPH, Color::Yellow);
        }
        if board.pacmans.iter().any(|p| !p.alive && p.position == pos) {
            return (DEAD_GLYPH, Color::Red);
        }
        if board.ghost_at(pos, None).is_some() {
            return (GHOST_GLYPH, Color::Magenta);
        }
        let color = match cell {
            Cell::Wall => Color::Blue,
            Cell::Floor => Color::DarkGrey,
            Cell::Pickup => Color::White,
            Cell::Portal => Color::Green,
        };
        (cell.mark(), color)
    }

    fn banner(board: &Board, mode: DrawMode) -> String {
        match mode {
            DrawMode::Menu => format!("Level {} | WASD/arrows to move, R random, Q quit", board.name),
            DrawMode::Play => format!("Level {} | Points: {} | Frame: {}", board.name, board.score(), board.frame),
            DrawMode::GameOver => format!("GAME OVER | Points: {}", board.score()),
            DrawMode::Victory => format!("YOU WIN | Points: {}", board.score()),
        }
    }
}

impl RenderSink for TerminalFrontend {
    fn draw(&mut self, board: &Board, mode: DrawMode) -> io::Result<()> {
        queue!(self.writer, Clear(ClearType::All), MoveTo(0, 0))?;

        for (row, cells) in board.grid.row_slices().enumerate() {
            queue!(self.writer, MoveTo(0, row as u16))?;
            for (col, &cell) in cells.iter().enumerate() {
                let (glyph, color) = Self::glyph_at(board, Position::new(row, col), cell);
                queue!(self.writer, SetForegroundColor(color), Print(glyph))?;
            }
        }

        queue!(
            self.writer,
            ResetColor,
            MoveTo(0, board.grid.rows() as u16 + 1),
            Print(Self::banner(board, mode))
        )?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl InputSource for TerminalFrontend {
    fn next_command(&mut self) -> Option<Command> {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    warn!(error = %e, "key poll failed");
                    return None;
                }
            }

            let key = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => key,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "key read failed");
                    return None;
                }
            };

            // Raw mode swallows SIGINT
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Some(Command::quit());
            }

            let command = match key.code {
                KeyCode::Char(c) => Command::from_key(c),
                KeyCode::Up => Some(Command::step(Direction::Up)),
                KeyCode::Left => Some(Command::step(Direction::Left)),
                KeyCode::Down => Some(Command::step(Direction::Down)),
                KeyCode::Right => Some(Command::step(Direction::Right)),
                KeyCode::Esc => Some(Command::quit()),
                _ => None,
            };
            if command.is_some() {
                return command;
            }
        }
    }
}

impl Pacer for TerminalFrontend {
    fn pause(&mut self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}
