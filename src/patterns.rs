//! SOS pattern detection around a single cell.
//!
//! Every query looks only at the lines through one cell: for each of the four
//! [`DIRECTIONS`], the three windows of three cells that contain it (the cell
//! as last, middle or first letter). That is 12 candidate triples per call.
//!
//! Since the directions carry one sign each, a given set of three cells is
//! examined at most once, and each distinct triple found is worth one point.
//!
//! Detection never mutates the board. Hypothetical placements are answered by
//! [`would_complete`], which reads the candidate letter in place of the empty
//! cell instead of writing it.

use tracing::instrument;

use crate::board::{Board, Cell, Letter, Point};
use crate::constants::{DIRECTIONS, LINE_LEN};

/// Letters an SOS line must hold, in order.
const PATTERN: [Letter; LINE_LEN] = [Letter::S, Letter::O, Letter::S];

/// Three collinear, step-adjacent cells holding S, O, S in that order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SosMatch {
    pub cells: [Point; LINE_LEN],
}

impl SosMatch {
    pub fn contains(&self, point: Point) -> bool {
        self.cells.contains(&point)
    }
}

/// All SOS triples that include `(row, col)`, reading `placed` as the
/// content of that cell. Other cells are read from the board.
fn scan(board: &Board, (row, col): Point, placed: Cell) -> Vec<SosMatch> {
    let mut found = Vec::new();
    if !board.contains(row, col) {
        return found;
    }

    for dir in DIRECTIONS {
        // `start` is the offset of the triple's first cell from (row, col).
        for start in [-2isize, -1, 0] {
            let mut cells = [(row, col); LINE_LEN];
            let mut in_bounds = true;
            for (i, slot) in cells.iter_mut().enumerate() {
                match board.step((row, col), dir, start + i as isize) {
                    Some(p) => *slot = p,
                    None => {
                        in_bounds = false;
                        break;
                    }
                }
            }
            if !in_bounds {
                continue;
            }

            let spells_sos = cells.iter().zip(PATTERN).all(|(&(r, c), want)| {
                let cell = if (r, c) == (row, col) {
                    placed
                } else {
                    board.get(r, c).unwrap_or(Cell::Empty)
                };
                cell == Cell::Letter(want)
            });
            if spells_sos {
                found.push(SosMatch { cells });
            }
        }
    }
    found
}

/// Every SOS triple through `(row, col)` on the board as it stands.
///
/// Meant to be called right after a letter was placed there. The length of
/// the result is the number of points that placement earned.
#[instrument(skip(board))]
pub fn matches_through(board: &Board, row: usize, col: usize) -> Vec<SosMatch> {
    let Ok(placed) = board.get(row, col) else {
        return Vec::new();
    };
    scan(board, (row, col), placed)
}

/// True if the letter at `(row, col)` is part of at least one SOS.
pub fn is_completion_at(board: &Board, row: usize, col: usize) -> bool {
    !matches_through(board, row, col).is_empty()
}

/// Would placing `letter` on the empty cell `(row, col)` complete an SOS?
///
/// Returns false for occupied or out-of-range cells. The board is not touched.
pub fn would_complete(board: &Board, row: usize, col: usize, letter: Letter) -> bool {
    count_if_placed(board, row, col, letter) > 0
}

/// Number of SOS triples placing `letter` on the empty cell `(row, col)`
/// would form. Zero for occupied or out-of-range cells.
pub fn count_if_placed(board: &Board, row: usize, col: usize, letter: Letter) -> usize {
    match board.get(row, col) {
        Ok(Cell::Empty) => scan(board, (row, col), Cell::Letter(letter)).len(),
        _ => 0,
    }
}
