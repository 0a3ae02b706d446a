//! SOS rules engine.
//!
//! One state machine serves both variants:
//!
//! - **Simple**: the first SOS ends the game and its maker wins. A full board
//!   with no SOS is a draw.
//! - **General**: play continues until the board is full. Each SOS triple is
//!   one point for the player who formed it, and forming at least one earns
//!   an extra turn. Most points wins; equal points draw.
//!
//! [`RuleEngine`] is the only thing that mutates the board, the score, or the
//! phase. [`RuleEngine::apply_move`] either commits all three or returns an
//! error and changes nothing.

use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, BoardError, Letter, Point};
use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::patterns::{self, SosMatch};

/// The two sides. Blue always moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Color {
    Blue,
    Red,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Blue => Color::Red,
            Color::Red => Color::Blue,
        }
    }
}

/// Rule variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum Mode {
    #[default]
    Simple,
    General,
}

/// SOS count per color. Only General mode credits points.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub blue: u32,
    pub red: u32,
}

impl Score {
    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::Blue => self.blue,
            Color::Red => self.red,
        }
    }

    pub fn total(&self) -> u32 {
        self.blue + self.red
    }

    fn credit(&mut self, color: Color, points: u32) {
        match color {
            Color::Blue => self.blue += points,
            Color::Red => self.red += points,
        }
    }

    /// Final result on a full board: higher score wins, equal is a draw.
    pub fn verdict(&self) -> GameOutcome {
        match self.blue.cmp(&self.red) {
            std::cmp::Ordering::Greater => GameOutcome::Win(Color::Blue),
            std::cmp::Ordering::Less => GameOutcome::Win(Color::Red),
            std::cmp::Ordering::Equal => GameOutcome::Draw,
        }
    }
}

/// Result of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum GameOutcome {
    #[display("in progress")]
    InProgress,
    #[display("{_0} wins")]
    Win(Color),
    #[display("draw")]
    Draw,
}

/// Where the engine is between moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingMove(Color),
    /// Terminal. Never holds [`GameOutcome::InProgress`].
    GameEnded(GameOutcome),
}

/// What an applied move led to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The other color moves next.
    TurnAdvanced(Color),
    /// General mode: the mover scored and moves again.
    ExtraTurn(Color),
    GameEnded(GameOutcome),
}

/// A letter placed on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub letter: Letter,
}

impl Move {
    pub fn new(row: usize, col: usize, letter: Letter) -> Self {
        Self { row, col, letter }
    }

    pub fn point(&self) -> Point {
        (self.row, self.col)
    }
}

/// Everything a renderer needs to reflect one applied move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub mover: Color,
    pub placed: Move,
    /// SOS triples formed by this move, credited to `mover`.
    pub matches: Vec<SosMatch>,
    /// Score after the move.
    pub score: Score,
    pub transition: Transition,
}

impl MoveOutcome {
    /// Distinct cells covered by the new matches, in discovery order.
    pub fn matched_cells(&self) -> Vec<Point> {
        let mut cells: Vec<Point> = Vec::new();
        for point in self.matches.iter().flat_map(|m| m.cells) {
            if !cells.contains(&point) {
                cells.push(point);
            }
        }
        cells
    }

    /// Color to move next, or `None` once the game is over.
    pub fn next_to_move(&self) -> Option<Color> {
        match self.transition {
            Transition::TurnAdvanced(c) | Transition::ExtraTurn(c) => Some(c),
            Transition::GameEnded(_) => None,
        }
    }

    pub fn outcome(&self) -> GameOutcome {
        match self.transition {
            Transition::GameEnded(outcome) => outcome,
            _ => GameOutcome::InProgress,
        }
    }
}

/// A rejected move. The engine state is untouched.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    #[display("({row}, {col}) is outside the {size}x{size} board")]
    OutOfRange { row: usize, col: usize, size: usize },
    #[display("({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
    #[display("game is already over")]
    GameOver,
}

impl From<BoardError> for MoveError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::OutOfRange { row, col, size } => MoveError::OutOfRange { row, col, size },
            BoardError::Occupied { row, col } => MoveError::Occupied { row, col },
        }
    }
}

/// A rejected game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    #[display("board size {} is outside {}..={}", size, MIN_BOARD_SIZE, MAX_BOARD_SIZE)]
    InvalidSize { size: usize },
}

/// Check a board size against the supported range.
pub fn validate_size(size: usize) -> Result<(), ConfigError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSize { size })
    }
}

/// Board, score and turn state of one game.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    mode: Mode,
    board: Board,
    score: Score,
    phase: Phase,
}

impl RuleEngine {
    pub fn new(size: usize, mode: Mode) -> Result<Self, ConfigError> {
        validate_size(size)?;
        Ok(Self {
            mode,
            board: Board::new(size),
            score: Score::default(),
            phase: Phase::AwaitingMove(Color::Blue),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Color whose move it is, or `None` once the game has ended.
    pub fn current_color(&self) -> Option<Color> {
        match self.phase {
            Phase::AwaitingMove(color) => Some(color),
            Phase::GameEnded(_) => None,
        }
    }

    pub fn outcome(&self) -> GameOutcome {
        match self.phase {
            Phase::AwaitingMove(_) => GameOutcome::InProgress,
            Phase::GameEnded(outcome) => outcome,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameEnded(_))
    }

    /// Every (empty cell, letter) pair, row-major with S before O.
    /// Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        self.board
            .empty_cells()
            .flat_map(|(row, col)| Letter::ALL.map(|letter| Move::new(row, col, letter)))
            .collect()
    }

    /// Would `letter` at `(row, col)` complete an SOS? Does not mutate.
    pub fn would_complete(&self, row: usize, col: usize, letter: Letter) -> bool {
        patterns::would_complete(&self.board, row, col, letter)
    }

    /// Check a move without applying it.
    pub fn validate(&self, row: usize, col: usize) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        match self.board.get(row, col)? {
            cell if cell.is_empty() => Ok(()),
            _ => Err(MoveError::Occupied { row, col }),
        }
    }

    /// Place `letter` for the current color and resolve the consequences.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn apply_move(
        &mut self,
        row: usize,
        col: usize,
        letter: Letter,
    ) -> Result<MoveOutcome, MoveError> {
        let Phase::AwaitingMove(mover) = self.phase else {
            warn!("move after game end rejected");
            return Err(MoveError::GameOver);
        };
        if let Err(err) = self.board.set(row, col, letter) {
            warn!(%err, "move rejected");
            return Err(err.into());
        }

        let matches = patterns::matches_through(&self.board, row, col);
        let full = self.board.is_full();

        let transition = match self.mode {
            Mode::Simple => {
                if !matches.is_empty() {
                    Transition::GameEnded(GameOutcome::Win(mover))
                } else if full {
                    Transition::GameEnded(GameOutcome::Draw)
                } else {
                    Transition::TurnAdvanced(mover.opponent())
                }
            }
            Mode::General => {
                if !matches.is_empty() {
                    self.score.credit(mover, matches.len() as u32);
                    debug!(%mover, points = matches.len(), "SOS formed");
                }
                if full {
                    Transition::GameEnded(self.score.verdict())
                } else if !matches.is_empty() {
                    Transition::ExtraTurn(mover)
                } else {
                    Transition::TurnAdvanced(mover.opponent())
                }
            }
        };

        self.phase = match transition {
            Transition::TurnAdvanced(next) | Transition::ExtraTurn(next) => {
                Phase::AwaitingMove(next)
            }
            Transition::GameEnded(outcome) => {
                info!(%outcome, "game ended");
                Phase::GameEnded(outcome)
            }
        };

        Ok(MoveOutcome {
            mover,
            placed: Move::new(row, col, letter),
            matches,
            score: self.score,
            transition,
        })
    }

    /// Start over on an empty board of `size`, keeping the mode.
    #[instrument(skip(self))]
    pub fn reset(&mut self, size: usize) -> Result<(), ConfigError> {
        validate_size(size)?;
        self.board = Board::new(size);
        self.score = Score::default();
        self.phase = Phase::AwaitingMove(Color::Blue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn play(engine: &mut RuleEngine, moves: &[(usize, usize, Letter)]) -> MoveOutcome {
        let mut last = None;
        for &(row, col, letter) in moves {
            last = Some(engine.apply_move(row, col, letter).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn test_new_engine_awaits_blue() {
        let engine = RuleEngine::new(3, Mode::Simple).unwrap();
        assert_eq!(engine.phase(), Phase::AwaitingMove(Color::Blue));
        assert_eq!(engine.outcome(), GameOutcome::InProgress);
        assert_eq!(engine.legal_moves().len(), 18);
    }

    #[test]
    fn test_size_bounds() {
        assert_eq!(
            RuleEngine::new(2, Mode::Simple).unwrap_err(),
            ConfigError::InvalidSize { size: 2 }
        );
        assert!(RuleEngine::new(21, Mode::General).is_err());
        assert!(RuleEngine::new(3, Mode::General).is_ok());
        assert!(RuleEngine::new(20, Mode::Simple).is_ok());
    }

    #[test]
    fn test_turn_alternates_without_match() {
        let mut engine = RuleEngine::new(3, Mode::Simple).unwrap();
        let out = engine.apply_move(0, 0, Letter::S).unwrap();
        assert_eq!(out.mover, Color::Blue);
        assert_eq!(out.transition, Transition::TurnAdvanced(Color::Red));
        let out = engine.apply_move(2, 2, Letter::O).unwrap();
        assert_eq!(out.mover, Color::Red);
        assert_eq!(engine.current_color(), Some(Color::Blue));
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut engine = RuleEngine::new(3, Mode::General).unwrap();
        engine.apply_move(1, 1, Letter::O).unwrap();
        let board = engine.board().clone();

        assert_eq!(
            engine.apply_move(1, 1, Letter::S),
            Err(MoveError::Occupied { row: 1, col: 1 })
        );
        assert_eq!(
            engine.apply_move(3, 0, Letter::S),
            Err(MoveError::OutOfRange { row: 3, col: 0, size: 3 })
        );
        assert_eq!(engine.board(), &board);
        assert_eq!(engine.phase(), Phase::AwaitingMove(Color::Red));
        assert_eq!(engine.score(), Score::default());
    }

    #[test]
    fn test_simple_first_sos_wins() {
        let mut engine = RuleEngine::new(3, Mode::Simple).unwrap();
        let out = play(
            &mut engine,
            &[(0, 0, Letter::S), (0, 1, Letter::O), (0, 2, Letter::S)],
        );
        assert_eq!(out.mover, Color::Blue);
        assert_eq!(out.transition, Transition::GameEnded(GameOutcome::Win(Color::Blue)));
        assert_eq!(out.matched_cells(), vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(engine.score(), Score::default());
        assert_eq!(engine.apply_move(2, 2, Letter::S), Err(MoveError::GameOver));
        assert!(engine.legal_moves().is_empty());
    }

    #[test]
    fn test_general_extra_turn_and_score() {
        let mut engine = RuleEngine::new(3, Mode::General).unwrap();
        let out = play(
            &mut engine,
            &[(0, 0, Letter::S), (0, 1, Letter::O), (0, 2, Letter::S)],
        );
        assert_eq!(out.transition, Transition::ExtraTurn(Color::Blue));
        assert_eq!(out.score, Score { blue: 1, red: 0 });
        assert_eq!(engine.current_color(), Some(Color::Blue));
    }

    #[test]
    fn test_general_full_board_without_score_draws() {
        let mut engine = RuleEngine::new(3, Mode::General).unwrap();
        // Fill everything except (2, 2) with O, alternating colors.
        let mut cells: Vec<Point> = engine.board().empty_cells().collect();
        cells.pop();
        for (row, col) in cells {
            engine.apply_move(row, col, Letter::O).unwrap();
        }
        // Eight O moves with no score: Blue moves ninth.
        assert_eq!(engine.current_color(), Some(Color::Blue));
        let out = engine.apply_move(2, 2, Letter::S).unwrap();
        assert!(out.matches.is_empty());
        assert_eq!(out.transition, Transition::GameEnded(GameOutcome::Draw));
        assert_eq!(engine.board().get(2, 2), Ok(Cell::Letter(Letter::S)));
    }

    #[test]
    fn test_score_verdict() {
        assert_eq!(Score { blue: 2, red: 1 }.verdict(), GameOutcome::Win(Color::Blue));
        assert_eq!(Score { blue: 0, red: 3 }.verdict(), GameOutcome::Win(Color::Red));
        assert_eq!(Score { blue: 2, red: 2 }.verdict(), GameOutcome::Draw);
    }

    #[test]
    fn test_score_get_per_color() {
        let mut score = Score::default();
        score.credit(Color::Red, 2);
        score.credit(Color::Blue, 1);
        assert_eq!(score.get(Color::Blue), 1);
        assert_eq!(score.get(Color::Red), 2);
        assert_eq!(score.total(), 3);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut engine = RuleEngine::new(3, Mode::General).unwrap();
        play(
            &mut engine,
            &[(0, 0, Letter::S), (0, 1, Letter::O), (0, 2, Letter::S)],
        );
        engine.reset(5).unwrap();
        assert_eq!(engine.board().size(), 5);
        assert_eq!(engine.board().occupied_count(), 0);
        assert_eq!(engine.score(), Score::default());
        assert_eq!(engine.phase(), Phase::AwaitingMove(Color::Blue));
        assert_eq!(engine.mode(), Mode::General);
    }

    #[test]
    fn test_reset_rejects_degenerate_size() {
        let mut engine = RuleEngine::new(4, Mode::Simple).unwrap();
        engine.apply_move(0, 0, Letter::S).unwrap();
        assert_eq!(engine.reset(1), Err(ConfigError::InvalidSize { size: 1 }));
        assert_eq!(engine.board().size(), 4);
        assert_eq!(engine.board().occupied_count(), 1);
    }

    #[test]
    fn test_would_complete_matches_apply() {
        let mut engine = RuleEngine::new(3, Mode::Simple).unwrap();
        play(&mut engine, &[(1, 0, Letter::S), (1, 1, Letter::O)]);
        assert!(engine.would_complete(1, 2, Letter::S));
        assert!(!engine.would_complete(1, 2, Letter::O));
        assert_eq!(engine.board().get(1, 2), Ok(Cell::Empty));
        let out = engine.apply_move(1, 2, Letter::S).unwrap();
        assert_eq!(out.matches.len(), 1);
    }

    #[test]
    fn test_validate() {
        let mut engine = RuleEngine::new(3, Mode::Simple).unwrap();
        engine.apply_move(0, 0, Letter::O).unwrap();
        assert_eq!(engine.validate(0, 1), Ok(()));
        assert_eq!(engine.validate(0, 0), Err(MoveError::Occupied { row: 0, col: 0 }));
        assert!(matches!(engine.validate(5, 5), Err(MoveError::OutOfRange { .. })));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(GameOutcome::Win(Color::Red).to_string(), "Red wins");
        assert_eq!(GameOutcome::Draw.to_string(), "draw");
    }
}
