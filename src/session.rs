//! Game session: one rules engine plus who plays each color.
//!
//! The session never sleeps or schedules anything. When the color on turn is
//! played by the computer, [`GameSession::pending_automated`] names it; the
//! event loop driving the session decides when to call
//! [`GameSession::play_automated`]. The flag is read from the engine's turn
//! state, so resetting or finishing the game clears it and cancels any move
//! the loop had in mind.

use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

use crate::board::{Board, Letter};
use crate::constants::DEFAULT_BOARD_SIZE;
use crate::player::ComputerPlayer;
use crate::rules::{
    Color, ConfigError, GameOutcome, Mode, Move, MoveError, MoveOutcome, RuleEngine, Score,
    validate_size,
};

/// Who makes the moves for a color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum PlayerKind {
    #[default]
    Human,
    Computer,
}

/// Settings for a new game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub size: usize,
    pub mode: Mode,
    pub blue: PlayerKind,
    pub red: PlayerKind,
    /// Seed for the computer player. `None` picks a fresh random seed.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            mode: Mode::default(),
            blue: PlayerKind::Human,
            red: PlayerKind::Human,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn kind(&self, color: Color) -> PlayerKind {
        match color {
            Color::Blue => self.blue,
            Color::Red => self.red,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    #[display("{source}")]
    Move { source: MoveError },
    #[display("{color} is played by the computer")]
    AutomatedTurn { color: Color },
    #[display("no automated move is pending")]
    NoAutomatedMove,
}

impl From<MoveError> for SessionError {
    fn from(source: MoveError) -> Self {
        SessionError::Move { source }
    }
}

pub struct GameSession {
    engine: RuleEngine,
    config: SessionConfig,
    computer: ComputerPlayer,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let engine = RuleEngine::new(config.size, config.mode)?;
        Ok(Self {
            engine,
            computer: computer_for(&config),
            config,
        })
    }

    /// Start a new game with `config`. On error the current game is kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        validate_size(config.size)?;
        if config.mode == self.engine.mode() {
            self.engine.reset(config.size)?;
        } else {
            self.engine = RuleEngine::new(config.size, config.mode)?;
        }
        self.computer = computer_for(&config);
        self.config = config;
        info!(
            size = self.config.size,
            mode = %self.config.mode,
            blue = %self.config.blue,
            red = %self.config.red,
            "new game"
        );
        Ok(())
    }

    /// Start over with the current settings.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        self.reset(self.config.clone())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    pub fn score(&self) -> Score {
        self.engine.score()
    }

    pub fn current_color(&self) -> Option<Color> {
        self.engine.current_color()
    }

    pub fn outcome(&self) -> GameOutcome {
        self.engine.outcome()
    }

    /// False once the game has ended.
    pub fn is_active(&self) -> bool {
        !self.engine.is_over()
    }

    pub fn player_kind(&self, color: Color) -> PlayerKind {
        self.config.kind(color)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.engine.legal_moves()
    }

    pub fn would_complete(&self, row: usize, col: usize, letter: Letter) -> bool {
        self.engine.would_complete(row, col, letter)
    }

    /// Computer color owed a move, if any. `None` once the game has ended.
    pub fn pending_automated(&self) -> Option<Color> {
        self.engine
            .current_color()
            .filter(|&color| self.config.kind(color) == PlayerKind::Computer)
    }

    /// Apply a move requested by a human. Rejected while a computer is on turn.
    #[instrument(skip(self))]
    pub fn human_move(
        &mut self,
        row: usize,
        col: usize,
        letter: Letter,
    ) -> Result<MoveOutcome, SessionError> {
        if let Some(color) = self.engine.current_color() {
            if self.player_kind(color) == PlayerKind::Computer {
                return Err(SessionError::AutomatedTurn { color });
            }
        }
        self.apply(row, col, letter)
    }

    /// Let the computer play the pending automated move.
    #[instrument(skip(self))]
    pub fn play_automated(&mut self) -> Result<MoveOutcome, SessionError> {
        let Some(color) = self.pending_automated() else {
            return Err(SessionError::NoAutomatedMove);
        };
        let Some(mv) = self.computer.choose_move(&self.engine) else {
            return Err(SessionError::NoAutomatedMove);
        };
        debug!(%color, ?mv, "automated move");
        self.apply(mv.row, mv.col, mv.letter)
    }

    /// Play automated moves until a human is on turn or the game ends.
    pub fn drain_automated(&mut self) -> Result<Vec<MoveOutcome>, SessionError> {
        let mut outcomes = Vec::new();
        while self.pending_automated().is_some() {
            outcomes.push(self.play_automated()?);
        }
        Ok(outcomes)
    }

    fn apply(&mut self, row: usize, col: usize, letter: Letter) -> Result<MoveOutcome, SessionError> {
        Ok(self.engine.apply_move(row, col, letter)?)
    }
}

fn computer_for(config: &SessionConfig) -> ComputerPlayer {
    match config.seed {
        Some(seed) => ComputerPlayer::with_seed(seed),
        None => ComputerPlayer::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Transition;

    fn config(blue: PlayerKind, red: PlayerKind) -> SessionConfig {
        SessionConfig {
            blue,
            red,
            seed: Some(3),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let session = GameSession::new(SessionConfig::default()).unwrap();
        assert_eq!(session.board().size(), 3);
        assert_eq!(session.engine().mode(), Mode::Simple);
        assert_eq!(session.current_color(), Some(Color::Blue));
        assert!(session.is_active());
        assert_eq!(session.pending_automated(), None);
    }

    #[test]
    fn test_invalid_size_rejected() {
        let bad = SessionConfig {
            size: 2,
            ..SessionConfig::default()
        };
        assert!(GameSession::new(bad.clone()).is_err());

        let mut session = GameSession::new(SessionConfig::default()).unwrap();
        session.human_move(0, 0, Letter::S).unwrap();
        assert_eq!(session.reset(bad), Err(ConfigError::InvalidSize { size: 2 }));
        assert_eq!(session.board().occupied_count(), 1);
    }

    #[test]
    fn test_computer_blue_owes_first_move() {
        let session = GameSession::new(config(PlayerKind::Computer, PlayerKind::Human)).unwrap();
        assert_eq!(session.pending_automated(), Some(Color::Blue));
    }

    #[test]
    fn test_human_move_rejected_on_computer_turn() {
        let mut session =
            GameSession::new(config(PlayerKind::Computer, PlayerKind::Human)).unwrap();
        assert_eq!(
            session.human_move(0, 0, Letter::S),
            Err(SessionError::AutomatedTurn { color: Color::Blue })
        );
        assert_eq!(session.board().occupied_count(), 0);
    }

    #[test]
    fn test_human_move_raises_pending_flag() {
        let mut session =
            GameSession::new(config(PlayerKind::Human, PlayerKind::Computer)).unwrap();
        session.human_move(1, 1, Letter::O).unwrap();
        assert_eq!(session.pending_automated(), Some(Color::Red));

        let out = session.play_automated().unwrap();
        assert_eq!(out.mover, Color::Red);
        assert_eq!(session.board().occupied_count(), 2);
        assert_eq!(session.pending_automated(), None);
    }

    #[test]
    fn test_play_automated_without_pending() {
        let mut session = GameSession::new(SessionConfig::default()).unwrap();
        assert_eq!(session.play_automated(), Err(SessionError::NoAutomatedMove));
    }

    #[test]
    fn test_reset_clears_flag() {
        let mut session =
            GameSession::new(config(PlayerKind::Computer, PlayerKind::Computer)).unwrap();
        assert_eq!(session.pending_automated(), Some(Color::Blue));

        session
            .reset(config(PlayerKind::Human, PlayerKind::Human))
            .unwrap();
        assert_eq!(session.pending_automated(), None);
        assert_eq!(session.play_automated(), Err(SessionError::NoAutomatedMove));
    }

    #[test]
    fn test_flag_follows_turn_until_game_finishes() {
        let mut session =
            GameSession::new(config(PlayerKind::Computer, PlayerKind::Human)).unwrap();
        while session.is_active() {
            let color = session.current_color().unwrap();
            match session.player_kind(color) {
                PlayerKind::Computer => {
                    assert_eq!(session.pending_automated(), Some(color));
                    session.play_automated().unwrap();
                }
                PlayerKind::Human => {
                    assert_eq!(session.pending_automated(), None);
                    let mv = session.legal_moves()[0];
                    session.human_move(mv.row, mv.col, mv.letter).unwrap();
                }
            }
        }
        assert_eq!(session.pending_automated(), None);
        assert_eq!(session.play_automated(), Err(SessionError::NoAutomatedMove));
    }

    #[test]
    fn test_restart_keeps_settings() {
        let mut session = GameSession::new(SessionConfig {
            size: 5,
            mode: Mode::General,
            ..config(PlayerKind::Computer, PlayerKind::Human)
        })
        .unwrap();
        session.play_automated().unwrap();
        session.restart().unwrap();
        assert_eq!(session.board().size(), 5);
        assert_eq!(session.board().occupied_count(), 0);
        assert_eq!(session.engine().mode(), Mode::General);
        assert_eq!(session.pending_automated(), Some(Color::Blue));
    }

    #[test]
    fn test_computer_extra_turn_keeps_flag() {
        let mut session = GameSession::new(SessionConfig {
            mode: Mode::General,
            ..config(PlayerKind::Human, PlayerKind::Computer)
        })
        .unwrap();
        session.human_move(0, 0, Letter::S).unwrap();
        session.play_automated().unwrap();

        // Blue leaves Red an SOS without scoring itself.
        let setup = session
            .legal_moves()
            .into_iter()
            .find(|mv| {
                let mut engine = session.engine().clone();
                let out = engine.apply_move(mv.row, mv.col, mv.letter).unwrap();
                out.matches.is_empty()
                    && engine
                        .legal_moves()
                        .iter()
                        .any(|m| engine.would_complete(m.row, m.col, m.letter))
            })
            .unwrap();
        session
            .human_move(setup.row, setup.col, setup.letter)
            .unwrap();
        assert_eq!(session.pending_automated(), Some(Color::Red));

        let out = session.play_automated().unwrap();
        assert!(!out.matches.is_empty());
        assert_eq!(out.transition, Transition::ExtraTurn(Color::Red));
        assert_eq!(session.pending_automated(), Some(Color::Red));
    }

    #[test]
    fn test_drain_computer_vs_computer() {
        let mut session = GameSession::new(SessionConfig {
            size: 4,
            mode: Mode::General,
            ..config(PlayerKind::Computer, PlayerKind::Computer)
        })
        .unwrap();
        let outcomes = session.drain_automated().unwrap();
        assert!(!session.is_active());
        assert_eq!(outcomes.len(), 16);
        assert!(matches!(
            outcomes.last().map(|o| o.transition),
            Some(Transition::GameEnded(_))
        ));
        let total: usize = outcomes.iter().map(|o| o.matches.len()).sum();
        assert_eq!(total as u32, session.score().total());
        assert_eq!(session.pending_automated(), None);
    }

    #[test]
    fn test_mode_change_on_reset() {
        let mut session = GameSession::new(SessionConfig::default()).unwrap();
        session
            .reset(SessionConfig {
                size: 6,
                mode: Mode::General,
                ..SessionConfig::default()
            })
            .unwrap();
        assert_eq!(session.engine().mode(), Mode::General);
        assert_eq!(session.board().size(), 6);
    }
}
