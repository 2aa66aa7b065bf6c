use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use minimax_turn::{Color, Player, SearchConfig, TurnRequest, UciHandler, DEFAULT_MAX_DEPTH};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// Picks one chess move per turn. Without `--fen` it speaks UCI on stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "minimax-turn", version, about, long_about = None)]
struct Cli {
    /// Play a single turn from this position and print the move
    #[arg(long)]
    fen: Option<String>,

    /// Side to move for `--fen`
    #[arg(long, value_enum, default_value = "white")]
    color: Side,

    /// Clock left for the side to move, in milliseconds
    #[arg(long, default_value_t = 300_000)]
    remaining_ms: u64,

    /// Moves already played in the game
    #[arg(long, default_value_t = 0)]
    history_len: usize,

    /// Deepest search run per root move
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// Seed for tie-breaking between equally scored moves
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SearchConfig {
        max_depth: cli.max_depth,
        seed: cli.seed,
    };

    match cli.fen {
        Some(fen) => {
            let color = Color::from(cli.color);
            let mut player = Player::new(&config);
            player.game_started(color);
            let turn = TurnRequest {
                fen: &fen,
                color,
                remaining_ns: cli.remaining_ms.saturating_mul(1_000_000),
                history_len: cli.history_len,
            };
            let mv = player.make_move(&turn).map_err(|err| {
                error!(%err, "turn failed");
                err
            });
            let mv = mv.with_context(|| format!("no move for {} from {}", color, fen))?;
            println!("{}", mv);
            Ok(())
        }
        None => UciHandler::new(&config).run(),
    }
}
