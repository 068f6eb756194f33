//! State Hashing for Replay Verification
//!
//! Two runs of the same level from a fresh load must hash identically
//! frame for frame. Order of updates is part of the format.

use sha2::{Sha256, Digest};

use super::grid::{Grid, Position};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for board state.
///
/// Wraps SHA-256 with helpers for grid types.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for board state.
    pub fn for_board_state() -> Self {
        Self::new(b"PACTERM_BOARD_V1")
    }

    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a usize, widened to u64 so hashes match across targets.
    #[inline]
    pub fn update_usize(&mut self, value: usize) {
        self.update_u64(value as u64);
    }

    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    #[inline]
    pub fn update_position(&mut self, pos: Position) {
        self.update_usize(pos.row);
        self.update_usize(pos.col);
    }

    /// Update with dimensions and every cell, row-major.
    pub fn update_grid(&mut self, grid: &Grid) {
        self.update_usize(grid.rows());
        self.update_usize(grid.cols());
        for cell in grid.cells() {
            self.update_u8(*cell as u8);
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for board verification.
///
/// Called by `Board::compute_hash()`. The closure adds entity state.
pub fn compute_state_hash<F>(frame: u64, grid: &Grid, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_board_state();

    // Always hash frame and geometry first
    hasher.update_u64(frame);
    hasher.update_grid(grid);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Cell;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_board_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_position(Position::new(3, 4));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_grid_change_changes_hash() {
        let mut grid = Grid::filled(2, 2, Cell::Pickup);
        let before = compute_state_hash(0, &grid, |_| {});

        grid.set(Position::new(1, 1), Cell::Floor);
        let after = compute_state_hash(0, &grid, |_| {});

        assert_ne!(before, after);
        assert_ne!(before, compute_state_hash(1, &Grid::filled(2, 2, Cell::Pickup), |_| {}));
    }
}
