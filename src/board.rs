//! Square letter grid with no game semantics.

use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};

/// A letter a player may place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Letter {
    S,
    O,
}

impl Letter {
    /// Both letters, in the order automated players try them.
    pub const ALL: [Letter; 2] = [Letter::S, Letter::O];

    pub fn as_char(self) -> char {
        match self {
            Letter::S => 'S',
            Letter::O => 'O',
        }
    }
}

/// Error returned when text does not name a letter.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
#[display("expected S or O, got {input:?}")]
pub struct ParseLetterError {
    pub input: String,
}

impl FromStr for Letter {
    type Err = ParseLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "S" | "s" => Ok(Letter::S),
            "O" | "o" => Ok(Letter::O),
            other => Err(ParseLetterError {
                input: other.to_string(),
            }),
        }
    }
}

/// Contents of one board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Letter(Letter),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// A (row, column) coordinate.
pub type Point = (usize, usize);

/// Failure to read or write a cell.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    #[display("({row}, {col}) is outside the {size}x{size} board")]
    OutOfRange { row: usize, col: usize, size: usize },
    #[display("({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
}

/// N×N grid of cells, stored row-major. The size is fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    fn check(&self, row: usize, col: usize) -> Result<usize, BoardError> {
        if row >= self.size || col >= self.size {
            return Err(BoardError::OutOfRange {
                row,
                col,
                size: self.size,
            });
        }
        Ok(self.idx(row, col))
    }

    /// True if (row, col) lies on the board.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Offset `point` by `steps` times `(dr, dc)`, returning `None` if the
    /// result falls off the board.
    pub fn step(&self, (row, col): Point, (dr, dc): (isize, isize), steps: isize) -> Option<Point> {
        let r = row.checked_add_signed(dr * steps)?;
        let c = col.checked_add_signed(dc * steps)?;
        self.contains(r, c).then_some((r, c))
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Cell, BoardError> {
        self.check(row, col).map(|i| self.cells[i])
    }

    /// Place `letter` on an empty in-range cell.
    pub fn set(&mut self, row: usize, col: usize, letter: Letter) -> Result<(), BoardError> {
        let i = self.check(row, col)?;
        if !self.cells[i].is_empty() {
            return Err(BoardError::Occupied { row, col });
        }
        self.cells[i] = Cell::Letter(letter);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Empty coordinates in row-major order. Recomputed on every call.
    pub fn empty_cells(&self) -> impl Iterator<Item = Point> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(move |(i, _)| (i / size, i % size))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self.cells[self.idx(row, col)] {
                    Cell::Letter(letter) => letter.as_char(),
                    Cell::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
