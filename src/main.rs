//! SOS-Rust: the SOS letter game.
//!
//! ## Usage
//!
//! - `sos-rust` - Play a computer-vs-computer demo game
//! - `sos-rust protocol` - Start the text protocol on stdin/stdout
//! - `sos-rust demo` - Play a computer-vs-computer demo game
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use sos_rust::constants::DEFAULT_BOARD_SIZE;
use sos_rust::protocol::{ProtocolEngine, format_outcome};
use sos_rust::rules::Mode;
use sos_rust::session::{GameSession, PlayerKind, SessionConfig};

/// SOS-Rust: the SOS letter game
#[derive(Parser)]
#[command(name = "sos-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol for use with a front end
    Protocol(GameArgs),
    /// Play a full game between two computer players
    Demo {
        #[command(flatten)]
        game: GameArgs,
        /// Pause between moves, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
}

#[derive(Args, Clone)]
struct GameArgs {
    /// Board size (3 to 20)
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Rule variant
    #[arg(long, value_enum, default_value_t = ModeArg::Simple)]
    mode: ModeArg,
    /// Who plays Blue
    #[arg(long, value_enum, default_value_t = KindArg::Human)]
    blue: KindArg,
    /// Who plays Red
    #[arg(long, value_enum, default_value_t = KindArg::Human)]
    red: KindArg,
    /// Seed for the computer player
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Copy, Clone, ValueEnum)]
enum ModeArg {
    Simple,
    General,
}

#[derive(Copy, Clone, ValueEnum)]
enum KindArg {
    Human,
    Computer,
}

impl Default for GameArgs {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            mode: ModeArg::Simple,
            blue: KindArg::Human,
            red: KindArg::Human,
            seed: None,
        }
    }
}

impl GameArgs {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            size: self.size,
            mode: match self.mode {
                ModeArg::Simple => Mode::Simple,
                ModeArg::General => Mode::General,
            },
            blue: kind(self.blue),
            red: kind(self.red),
            seed: self.seed,
        }
    }
}

fn kind(arg: KindArg) -> PlayerKind {
    match arg {
        KindArg::Human => PlayerKind::Human,
        KindArg::Computer => PlayerKind::Computer,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Protocol(game)) => {
            let session = GameSession::new(game.config())?;
            ProtocolEngine::new(session).run()
        }
        Some(Commands::Demo { game, delay_ms }) => run_demo(&game, delay_ms),
        None => run_demo(&GameArgs::default(), 0),
    }
}

fn run_demo(game: &GameArgs, delay_ms: u64) -> Result<()> {
    let config = SessionConfig {
        blue: PlayerKind::Computer,
        red: PlayerKind::Computer,
        ..game.config()
    };
    println!(
        "SOS-Rust: {} game on a {}x{} board\n",
        config.mode, config.size, config.size
    );

    let mut session = GameSession::new(config)?;
    while session.pending_automated().is_some() {
        if delay_ms > 0 {
            thread::sleep(Duration::from_millis(delay_ms));
        }
        let outcome = session.play_automated()?;
        println!("{}", format_outcome(&outcome));
    }

    println!("\n{}", session.board());
    let score = session.score();
    println!("Score: Blue {} Red {}", score.blue, score.red);
    println!("Result: {}", session.outcome());
    Ok(())
}
