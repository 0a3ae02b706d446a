//! Constants for board dimensions and line geometry.
//!
//! The board is an N×N grid stored row-major. Sizes outside
//! [`MIN_BOARD_SIZE`]..=[`MAX_BOARD_SIZE`] are rejected when a game is
//! created or reset.

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest playable board. Anything smaller cannot hold a three-cell line
/// in every direction.
pub const MIN_BOARD_SIZE: usize = 3;

/// Largest supported board.
pub const MAX_BOARD_SIZE: usize = 20;

/// Board size used when nothing else is configured.
pub const DEFAULT_BOARD_SIZE: usize = 3;

// =============================================================================
// Line Directions
// =============================================================================

/// The four line directions as (row step, column step):
/// horizontal, vertical, main diagonal, anti-diagonal.
///
/// Only one sign per direction is listed. S-O-S reads the same both ways, so
/// scanning the opposite sign would report every line twice.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Number of cells in an SOS line.
pub const LINE_LEN: usize = 3;
