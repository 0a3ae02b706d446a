//! Line-oriented text protocol for driving a game session.
//!
//! Modelled on GTP: one command per line, an optional numeric id in front,
//! and a reply of `=[id] text` on success or `?[id] text` on failure, each
//! followed by a blank line. Lines that are empty or start with `#` are
//! ignored.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `boardsize <n>` - New game on an n×n board
//! - `mode <simple|general>` - New game with the given rules
//! - `players <blue> <red>` - New game, each side `human` or `computer`
//! - `clear_board` - New game with the current settings
//! - `play <row> <col> <S|O>` - Human move for the color on turn
//! - `genmove` - Play the pending computer move
//! - `showboard`, `score`, `status`
//!
//! Move replies read `<mover> <row> <col> <letter> sos=<n> <next>` where
//! `<next>` is `next=<color>`, `extra=<color>`, `winner=<color>` or `draw`.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{debug, warn};

use crate::board::Letter;
use crate::rules::{Color, GameOutcome, Mode, MoveOutcome, Phase, Transition};
use crate::session::{GameSession, PlayerKind, SessionConfig};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "list_commands",
    "mode",
    "name",
    "play",
    "players",
    "quit",
    "score",
    "showboard",
    "status",
    "version",
];

/// Protocol front end owning one session.
pub struct ProtocolEngine {
    session: GameSession,
}

impl ProtocolEngine {
    pub fn new(session: GameSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            debug!(%command, success, "command handled");

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the start of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) => self.new_game(SessionConfig {
                        size,
                        ..self.session.config().clone()
                    }),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "mode" => {
                let Some(mode) = args.first().and_then(|a| parse_mode(a)) else {
                    return (false, "expected simple or general".to_string());
                };
                self.new_game(SessionConfig {
                    mode,
                    ..self.session.config().clone()
                })
            }

            "players" => {
                let kinds = (
                    args.first().and_then(|a| parse_kind(a)),
                    args.get(1).and_then(|a| parse_kind(a)),
                );
                let (Some(blue), Some(red)) = kinds else {
                    return (false, "expected two of human or computer".to_string());
                };
                self.new_game(SessionConfig {
                    blue,
                    red,
                    ..self.session.config().clone()
                })
            }

            "clear_board" => match self.session.restart() {
                Ok(()) => (true, String::new()),
                Err(err) => (false, err.to_string()),
            },

            "play" => {
                let [row, col, letter] = args else {
                    return (false, "expected <row> <col> <S|O>".to_string());
                };
                let (Ok(row), Ok(col)) = (row.parse::<usize>(), col.parse::<usize>()) else {
                    return (false, "invalid coordinate".to_string());
                };
                let letter = match letter.parse::<Letter>() {
                    Ok(letter) => letter,
                    Err(err) => return (false, format!("{err}")),
                };
                match self.session.human_move(row, col, letter) {
                    Ok(outcome) => (true, format_outcome(&outcome)),
                    Err(err) => {
                        warn!(%err, "play rejected");
                        (false, err.to_string())
                    }
                }
            }

            "genmove" => match self.session.play_automated() {
                Ok(outcome) => (true, format_outcome(&outcome)),
                Err(err) => (false, err.to_string()),
            },

            "showboard" => (true, format!("\n{}", self.session.board()).trim_end().to_string()),

            "score" => {
                let score = self.session.score();
                (
                    true,
                    format!(
                        "blue {} red {}",
                        score.get(Color::Blue),
                        score.get(Color::Red)
                    ),
                )
            }

            "status" => (true, self.status()),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn new_game(&mut self, config: SessionConfig) -> (bool, String) {
        match self.session.reset(config) {
            Ok(()) => (true, String::new()),
            Err(err) => (false, err.to_string()),
        }
    }

    fn status(&self) -> String {
        match self.session.engine().phase() {
            Phase::AwaitingMove(color) => format!(
                "to_move={} {}",
                color_name(color),
                self.session.player_kind(color).to_string().to_lowercase()
            ),
            Phase::GameEnded(GameOutcome::Win(color)) => format!("winner={}", color_name(color)),
            Phase::GameEnded(_) => "draw".to_string(),
        }
    }
}

fn color_name(color: Color) -> String {
    color.to_string().to_lowercase()
}

fn parse_mode(s: &str) -> Option<Mode> {
    match s.to_lowercase().as_str() {
        "simple" => Some(Mode::Simple),
        "general" => Some(Mode::General),
        _ => None,
    }
}

fn parse_kind(s: &str) -> Option<PlayerKind> {
    match s.to_lowercase().as_str() {
        "human" => Some(PlayerKind::Human),
        "computer" => Some(PlayerKind::Computer),
        _ => None,
    }
}

/// One-line description of an applied move.
pub fn format_outcome(outcome: &MoveOutcome) -> String {
    let next = match outcome.transition {
        Transition::TurnAdvanced(color) => format!("next={}", color_name(color)),
        Transition::ExtraTurn(color) => format!("extra={}", color_name(color)),
        Transition::GameEnded(GameOutcome::Win(color)) => format!("winner={}", color_name(color)),
        Transition::GameEnded(_) => "draw".to_string(),
    };
    format!(
        "{} {} {} {} sos={} {next}",
        color_name(outcome.mover),
        outcome.placed.row,
        outcome.placed.col,
        outcome.placed.letter,
        outcome.matches.len()
    )
}
