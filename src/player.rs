//! Computer player.
//!
//! Strategy, in order:
//! 1. Take the move that forms the most SOS triples right now.
//! 2. Otherwise pick a random move that does not hand the opponent an
//!    immediate SOS.
//! 3. Otherwise pick any random legal move.
//!
//! The player only reads the engine. Lookahead for step 2 runs on a cloned
//! board, so the live game is never written to.

use fastrand::Rng;
use tracing::{debug, instrument};

use crate::board::{Board, Letter};
use crate::patterns;
use crate::rules::{Move, RuleEngine};

pub struct ComputerPlayer {
    rng: Rng,
}

impl Default for ComputerPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputerPlayer {
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }

    /// Deterministic player for reproducible games.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }

    /// Pick a move for the color currently on turn. `None` if the game is over.
    #[instrument(skip_all)]
    pub fn choose_move(&mut self, engine: &RuleEngine) -> Option<Move> {
        let moves = engine.legal_moves();
        if moves.is_empty() {
            return None;
        }

        if let Some(mv) = best_scoring_move(engine, &moves) {
            debug!(?mv, "taking SOS");
            return Some(mv);
        }

        let safe: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|&mv| !gives_opponent_sos(engine.board(), mv))
            .collect();
        let pool = if safe.is_empty() { &moves } else { &safe };
        let mv = pool[self.rng.usize(..pool.len())];
        debug!(?mv, safe = !safe.is_empty(), "random move");
        Some(mv)
    }
}

/// The legal move completing the most SOS triples. Ties go to the first
/// in row-major order, S before O.
pub fn best_scoring_move(engine: &RuleEngine, moves: &[Move]) -> Option<Move> {
    let mut best: Option<(usize, Move)> = None;
    for &mv in moves {
        if !engine.would_complete(mv.row, mv.col, mv.letter) {
            continue;
        }
        let points = patterns::count_if_placed(engine.board(), mv.row, mv.col, mv.letter);
        if best.is_none_or(|(top, _)| points > top) {
            best = Some((points, mv));
        }
    }
    best.map(|(_, mv)| mv)
}

/// Would playing `mv` leave an empty cell where the next player completes an
/// SOS? Only cells within two steps of `mv` can be affected.
fn gives_opponent_sos(board: &Board, mv: Move) -> bool {
    let mut next = board.clone();
    if next.set(mv.row, mv.col, mv.letter).is_err() {
        return true;
    }
    for dr in -2isize..=2 {
        for dc in -2isize..=2 {
            let Some((row, col)) = next.step(mv.point(), (dr, dc), 1) else {
                continue;
            };
            if Letter::ALL
                .iter()
                .any(|&letter| patterns::would_complete(&next, row, col, letter))
            {
                return true;
            }
        }
    }
    false
}
