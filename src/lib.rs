//! SOS-Rust: rules engine for the SOS letter game.
//!
//! Two players, Blue and Red, take turns writing `S` or `O` on an N×N grid
//! and try to spell S-O-S in a straight line. In the **Simple** variant the
//! first SOS wins. In the **General** variant the game runs until the board is
//! full, every SOS is a point, and scoring earns an extra turn.
//!
//! ## Modules
//!
//! - [`constants`] - Board size bounds and line directions
//! - [`board`] - Letter grid with no game semantics
//! - [`patterns`] - SOS detection around a placed cell
//! - [`rules`] - Move validation, scoring, turns and game end
//! - [`player`] - Computer opponent
//! - [`session`] - Engine plus player kinds and the automated-move flag
//! - [`protocol`] - Line-based text protocol over a session
//!
//! ## Example
//!
//! ```
//! use sos_rust::board::Letter;
//! use sos_rust::rules::{Color, Mode, RuleEngine, Transition};
//!
//! let mut engine = RuleEngine::new(3, Mode::General).unwrap();
//! engine.apply_move(0, 0, Letter::S).unwrap();
//! engine.apply_move(0, 1, Letter::O).unwrap();
//! let outcome = engine.apply_move(0, 2, Letter::S).unwrap();
//!
//! assert_eq!(outcome.matches.len(), 1);
//! assert_eq!(outcome.transition, Transition::ExtraTurn(Color::Blue));
//! ```

pub mod board;
pub mod constants;
pub mod patterns;
pub mod player;
pub mod protocol;
pub mod rules;
pub mod session;
